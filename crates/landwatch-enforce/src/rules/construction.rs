use landwatch_core::snapshot::DetectionSnapshot;
use landwatch_core::types::{Severity, ViolationCategory};

use super::{steps, Finding, Rule};

/// Built-up area beyond the approved area by more than the tolerated ratio.
#[derive(Debug, Clone, Copy)]
pub struct IllegalConstructionRule {
    threshold: f64,
}

impl IllegalConstructionRule {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }
}

impl Rule for IllegalConstructionRule {
    fn category(&self) -> ViolationCategory {
        ViolationCategory::IllegalConstruction
    }

    fn rank(&self) -> u8 {
        20
    }

    // Strictly greater: a ratio exactly at the threshold is tolerated.
    fn applies(&self, snapshot: &DetectionSnapshot) -> bool {
        snapshot.built_up_area() > 0.0 && snapshot.construction_ratio() > self.threshold
    }

    fn verdict(&self, snapshot: &DetectionSnapshot) -> Finding {
        let excess = snapshot.construction_ratio() - 1.0;
        let severity = if excess > 0.20 {
            Severity::High
        } else {
            Severity::Medium
        };
        let priority = if excess > 0.50 {
            1
        } else if excess > 0.20 {
            2
        } else {
            3
        };
        Finding {
            severity,
            confidence: (0.70 + excess / 2.0).min(0.90),
            priority,
            description: format!(
                "Illegal construction detected: built-up area {:.2} sqm exceeds approved area \
                 {:.2} sqm by {:.1}%. Potential unauthorized expansion or construction.",
                snapshot.built_up_area(),
                snapshot.approved_area(),
                excess * 100.0
            ),
            actions: steps(&[
                "Schedule field verification within 1 week",
                "Review approved building plans and permits",
                "Measure actual built-up area on site",
                "If confirmed, issue show-cause notice",
                "Assess for zoning/FAR violations",
                "Consider penalties or demolition if unapproved",
            ]),
            evidence: None,
        }
    }
}
