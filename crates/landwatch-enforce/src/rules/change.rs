use landwatch_core::snapshot::DetectionSnapshot;
use landwatch_core::types::{Severity, ViolationCategory};

use super::{steps, Finding, Rule};

/// A high change-detection score: rapid alteration of the plot.
#[derive(Debug, Clone, Copy)]
pub struct SuspiciousChangeRule {
    threshold: f64,
}

impl SuspiciousChangeRule {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }
}

impl Rule for SuspiciousChangeRule {
    fn category(&self) -> ViolationCategory {
        ViolationCategory::SuspiciousChange
    }

    fn rank(&self) -> u8 {
        30
    }

    fn applies(&self, snapshot: &DetectionSnapshot) -> bool {
        snapshot.change_score() >= self.threshold
    }

    fn verdict(&self, snapshot: &DetectionSnapshot) -> Finding {
        let score = snapshot.change_score();
        let severity = if score > 0.80 {
            Severity::Medium
        } else {
            Severity::Low
        };
        let priority = if score > 0.90 {
            2
        } else if score > 0.80 {
            3
        } else {
            4
        };
        Finding {
            severity,
            confidence: score,
            priority,
            description: format!(
                "Suspicious change detected: change confidence score {:.2}% indicates \
                 significant alterations to the plot. Possible unauthorized modifications \
                 or land use change.",
                score * 100.0
            ),
            actions: steps(&[
                "Review historical satellite imagery",
                "Compare with approved development timeline",
                "Schedule routine inspection within 2 weeks",
                "Verify if changes align with approved plans",
                "Check for permit applications or modifications",
                "Monitor for further changes",
            ]),
            evidence: None,
        }
    }
}
