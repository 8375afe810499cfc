use landwatch_core::snapshot::DetectionSnapshot;
use landwatch_core::types::{Severity, ViolationCategory};

use super::{steps, Finding, Rule};

pub const COMPLIANT_CONFIDENCE: f64 = 0.85;

/// Catch-all: always applies, always last.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompliantRule;

impl Rule for CompliantRule {
    fn category(&self) -> ViolationCategory {
        ViolationCategory::Compliant
    }

    fn rank(&self) -> u8 {
        u8::MAX
    }

    fn applies(&self, _snapshot: &DetectionSnapshot) -> bool {
        true
    }

    fn verdict(&self, snapshot: &DetectionSnapshot) -> Finding {
        Finding {
            severity: Severity::Low,
            confidence: COMPLIANT_CONFIDENCE,
            priority: 5,
            description: format!(
                "Plot is COMPLIANT: built-up area {:.2} sqm is within approved limits. \
                 No violations detected.",
                snapshot.built_up_area()
            ),
            actions: steps(&["Continue routine monitoring as per schedule"]),
            evidence: None,
        }
    }
}
