use landwatch_core::snapshot::DetectionSnapshot;
use landwatch_core::types::{Severity, ViolationCategory};

use super::{steps, Finding, Rule};

/// Activity detected outside the approved boundary.
#[derive(Debug, Clone, Copy, Default)]
pub struct EncroachmentRule;

impl Rule for EncroachmentRule {
    fn category(&self) -> ViolationCategory {
        ViolationCategory::Encroachment
    }

    fn rank(&self) -> u8 {
        10
    }

    fn applies(&self, snapshot: &DetectionSnapshot) -> bool {
        snapshot.has_encroachment()
    }

    fn verdict(&self, snapshot: &DetectionSnapshot) -> Finding {
        let ratio = snapshot.encroachment_ratio();
        let (severity, priority) = if ratio > 0.10 {
            (Severity::Critical, 1)
        } else if ratio > 0.05 {
            (Severity::High, 1)
        } else {
            (Severity::Medium, 2)
        };
        Finding {
            severity,
            confidence: (0.80 + ratio).min(0.95),
            priority,
            description: format!(
                "Encroachment detected: {:.2} sqm ({:.1}% of approved area) extends beyond \
                 the plot boundary. Unauthorized use of adjacent land.",
                snapshot.encroachment_area(),
                ratio * 100.0
            ),
            actions: steps(&[
                "Conduct field inspection within 24-48 hours",
                "Issue notice to plot owner/lessee",
                "Verify actual boundary markers on ground",
                "Initiate encroachment removal proceedings if confirmed",
                "Coordinate with local authorities for enforcement",
            ]),
            evidence: snapshot.encroachment_geometry().cloned(),
        }
    }
}
