use std::collections::BTreeMap;

use landwatch_core::config::Thresholds;
use landwatch_core::snapshot::DetectionSnapshot;
use landwatch_core::types::{ViolationCategory, ViolationVerdict};

use crate::rules::{default_rules, CompliantRule, Rule};

static FALLBACK: CompliantRule = CompliantRule;

/// Deterministic, prioritized rule chain.
///
/// `evaluate` is total: every well-formed snapshot gets exactly one verdict,
/// and an identical snapshot always gets an identical verdict.
pub struct ViolationClassifier {
    rules: Vec<Box<dyn Rule>>,
}

impl Default for ViolationClassifier {
    fn default() -> Self {
        Self::new(&Thresholds::default())
    }
}

impl std::fmt::Debug for ViolationClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViolationClassifier")
            .field("rules", &self.categories())
            .finish()
    }
}

impl ViolationClassifier {
    pub fn new(thresholds: &Thresholds) -> Self {
        let mut rules = default_rules(thresholds);
        rules.sort_by_key(|r| r.rank());
        Self { rules }
    }

    /// Insert a rule by rank, after any existing rule of equal rank.
    pub fn with_rule(mut self, rule: Box<dyn Rule>) -> Self {
        let at = self.rules.partition_point(|r| r.rank() <= rule.rank());
        self.rules.insert(at, rule);
        self
    }

    /// Rule categories in evaluation order.
    pub fn categories(&self) -> Vec<ViolationCategory> {
        self.rules.iter().map(|r| r.category()).collect()
    }

    pub fn evaluate(&self, snapshot: &DetectionSnapshot) -> ViolationVerdict {
        let rule: &dyn Rule = self
            .rules
            .iter()
            .map(|r| r.as_ref())
            .find(|r| r.applies(snapshot))
            .unwrap_or(&FALLBACK);
        let finding = rule.verdict(snapshot);
        let confidence = if finding.confidence.is_nan() {
            0.0
        } else {
            finding.confidence.clamp(0.0, 1.0)
        };

        let verdict = ViolationVerdict {
            parcel_id: snapshot.parcel_id().to_string(),
            category: rule.category(),
            severity: finding.severity,
            confidence,
            priority: finding.priority.clamp(1, 5),
            description: finding.description,
            actions: finding.actions,
            evidence: finding.evidence,
            snapshot_fingerprint: snapshot.fingerprint().to_string(),
        };

        if verdict.is_violation() {
            tracing::warn!(
                category = %verdict.category,
                parcel = %verdict.parcel_id,
                confidence = verdict.confidence,
                severity = %verdict.severity,
                "violation detected"
            );
        } else {
            tracing::debug!(parcel = %verdict.parcel_id, "parcel compliant");
        }
        verdict
    }

    /// Per-category counts, in category order.
    pub fn summarize(verdicts: &[ViolationVerdict]) -> BTreeMap<ViolationCategory, usize> {
        let mut counts = BTreeMap::new();
        for v in verdicts {
            *counts.entry(v.category).or_insert(0) += 1;
        }
        counts
    }
}

#[cfg(test)]
#[path = "classifier_tests.rs"]
mod tests;
