use landwatch_core::snapshot::DetectionSnapshot;
use landwatch_core::types::{Severity, ViolationCategory};

use super::{steps, Finding, Rule};

/// Built-up share under this percentage counts as minimal.
const MINIMAL_BUILT_UP_PERCENT: f64 = 5.0;

/// Minimal built-up area and minimal thermal activity.
///
/// Mean NDBI is carried on the snapshot but does not take part in the
/// decision.
#[derive(Debug, Clone, Copy)]
pub struct UnusedLandRule {
    heat_threshold: f64,
}

impl UnusedLandRule {
    /// `heat_threshold` is a fraction; the snapshot's heat share is a percentage.
    pub fn new(heat_threshold: f64) -> Self {
        Self { heat_threshold }
    }
}

impl Rule for UnusedLandRule {
    fn category(&self) -> ViolationCategory {
        ViolationCategory::UnusedLand
    }

    fn rank(&self) -> u8 {
        40
    }

    fn applies(&self, snapshot: &DetectionSnapshot) -> bool {
        snapshot.built_up_percentage() < MINIMAL_BUILT_UP_PERCENT
            && snapshot.heat_percentage() < self.heat_threshold * 100.0
    }

    fn verdict(&self, snapshot: &DetectionSnapshot) -> Finding {
        Finding {
            severity: Severity::Low,
            confidence: 1.0 - snapshot.built_up_percentage() / 100.0,
            priority: 4,
            description: format!(
                "Unused land detected: plot shows minimal activity with only {:.1}% built-up \
                 area and {:.1}% thermal signature. Land appears underutilized or abandoned.",
                snapshot.built_up_percentage(),
                snapshot.heat_percentage()
            ),
            actions: steps(&[
                "Verify lease/allotment status and terms",
                "Check compliance with development timeline",
                "Send reminder notice to plot owner",
                "Review industrial activity reports",
                "Consider penalties for prolonged non-utilization",
                "Evaluate for re-allotment if abandoned",
                "Continue quarterly monitoring",
            ]),
            evidence: None,
        }
    }
}
