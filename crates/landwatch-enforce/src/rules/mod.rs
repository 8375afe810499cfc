//! Rule strategies for the violation classifier.
//!
//! Each rule is an independent predicate plus scorer. The classifier holds
//! them ordered by [`Rule::rank`] and the first rule that applies decides
//! the verdict.

use landwatch_core::config::Thresholds;
use landwatch_core::snapshot::DetectionSnapshot;
use landwatch_core::types::{GeoShape, Severity, ViolationCategory};

pub mod change;
pub mod compliant;
pub mod construction;
pub mod encroachment;
pub mod unused;

pub use change::SuspiciousChangeRule;
pub use compliant::CompliantRule;
pub use construction::IllegalConstructionRule;
pub use encroachment::EncroachmentRule;
pub use unused::UnusedLandRule;

/// What a matching rule says about a snapshot. The classifier turns this
/// into a `ViolationVerdict`.
#[derive(Debug, Clone, PartialEq)]
pub struct Finding {
    pub severity: Severity,
    /// Raw score; clamped to [0, 1] by the classifier.
    pub confidence: f64,
    pub priority: u8,
    pub description: String,
    pub actions: Vec<String>,
    pub evidence: Option<GeoShape>,
}

pub trait Rule: Send + Sync {
    fn category(&self) -> ViolationCategory;

    /// Evaluation order; lower ranks are tried first.
    fn rank(&self) -> u8;

    fn applies(&self, snapshot: &DetectionSnapshot) -> bool;

    /// Score a snapshot this rule applies to.
    fn verdict(&self, snapshot: &DetectionSnapshot) -> Finding;
}

/// The standard rule chain, configured from thresholds.
pub fn default_rules(thresholds: &Thresholds) -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(EncroachmentRule),
        Box::new(IllegalConstructionRule::new(thresholds.illegal_construction_threshold)),
        Box::new(SuspiciousChangeRule::new(thresholds.change_detection_threshold)),
        Box::new(UnusedLandRule::new(thresholds.unused_land_threshold)),
        Box::new(CompliantRule),
    ]
}

pub(crate) fn steps(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
