// Reference parcels with known verdicts.

use landwatch_core::config::Thresholds;
use landwatch_core::snapshot::{DetectionSnapshot, SnapshotBuilder};
use landwatch_core::types::{LandUse, Severity, ViolationCategory};
use landwatch_enforce::ViolationClassifier;

fn plot() -> SnapshotBuilder {
    DetectionSnapshot::builder("REF-1", 10_000.0, LandUse::Manufacturing)
        .built_up(9_500.0, 95.0)
        .heat(1_800.0, 18.0)
        .change_score(0.2)
        .indices(0.12, 0.25)
}

fn classify(builder: SnapshotBuilder) -> landwatch_core::types::ViolationVerdict {
    ViolationClassifier::new(&Thresholds::default()).evaluate(&builder.build().unwrap())
}

#[test]
fn test_compliant_plot() {
    let v = classify(plot());
    assert_eq!(v.category, ViolationCategory::Compliant);
    assert!((v.confidence - 0.85).abs() < 1e-9);
    assert!(v.evidence.is_none());
}

#[test]
fn test_medium_encroachment_at_five_percent() {
    let v = classify(plot().encroachment(true, 500.0, None));
    assert_eq!(v.category, ViolationCategory::Encroachment);
    assert_eq!(v.severity, Severity::Medium);
    assert_eq!(v.priority, 2);
    assert!((v.confidence - 0.85).abs() < 1e-9);
}

#[test]
fn test_high_illegal_construction() {
    let v = classify(plot().built_up(16_000.0, 100.0));
    assert_eq!(v.category, ViolationCategory::IllegalConstruction);
    assert_eq!(v.severity, Severity::High);
    assert_eq!(v.priority, 1);
    assert!((v.confidence - 0.90).abs() < 1e-9);
}

#[test]
fn test_suspicious_change() {
    let v = classify(plot().change_score(0.95));
    assert_eq!(v.category, ViolationCategory::SuspiciousChange);
    assert_eq!(v.severity, Severity::Medium);
    assert_eq!(v.priority, 2);
    assert!((v.confidence - 0.95).abs() < 1e-9);
}

#[test]
fn test_construction_ratio_boundary() {
    let at = classify(plot().built_up(11_000.0, 100.0));
    assert_eq!(at.category, ViolationCategory::Compliant);
    let over = classify(plot().built_up(11_100.0, 100.0));
    assert_eq!(over.category, ViolationCategory::IllegalConstruction);
}

#[test]
fn test_every_violation_recommends_actions() {
    for builder in [
        plot().encroachment(true, 2_000.0, None),
        plot().built_up(16_000.0, 100.0),
        plot().change_score(0.8),
        plot().built_up(100.0, 1.0).heat(50.0, 0.5),
    ] {
        let v = classify(builder);
        assert!(v.is_violation());
        assert!(!v.actions.is_empty(), "{} has no actions", v.category);
        assert!(!v.description.is_empty());
    }
}
