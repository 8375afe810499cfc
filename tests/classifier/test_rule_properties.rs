// Properties that hold for every well-formed snapshot.

use landwatch_core::snapshot::DetectionSnapshot;
use landwatch_core::types::{InferenceMetrics, LandUse, ViolationCategory};
use landwatch_enforce::ViolationClassifier;
use proptest::prelude::*;

fn snapshot_strategy() -> impl Strategy<Value = DetectionSnapshot> {
    (
        1_000.0f64..50_000.0,
        0.0f64..2.0,
        0.0f64..100.0,
        0.0f64..100.0,
        0.0f64..=1.0,
        proptest::option::of(0.0f64..1.0),
    )
        .prop_map(|(approved, built_ratio, built_pct, heat_pct, change, encroach)| {
            let metrics = InferenceMetrics {
                built_up_area: approved * built_ratio,
                built_up_percentage: built_pct,
                heat_signature_area: approved * heat_pct / 100.0,
                heat_percentage: heat_pct,
                change_score: change,
                mean_ndvi: 0.1,
                mean_ndbi: 0.2,
            };
            let (flag, area) = match encroach {
                Some(ratio) => (true, approved * ratio),
                None => (false, 0.0),
            };
            DetectionSnapshot::builder("PROP-1", approved, LandUse::Industrial)
                .metrics(metrics)
                .encroachment(flag, area, None)
                .build()
                .unwrap()
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn verdict_is_deterministic_and_well_formed(snapshot in snapshot_strategy()) {
        let classifier = ViolationClassifier::default();
        let first = classifier.evaluate(&snapshot);
        let second = classifier.evaluate(&snapshot);
        prop_assert_eq!(&first, &second);
        prop_assert!((0.0..=1.0).contains(&first.confidence));
        prop_assert!((1..=5).contains(&first.priority));
        prop_assert_eq!(first.snapshot_fingerprint.as_str(), snapshot.fingerprint());
        prop_assert_eq!(first.is_violation(), first.category != ViolationCategory::Compliant);
    }

    #[test]
    fn encroachment_always_takes_precedence(snapshot in snapshot_strategy()) {
        let verdict = ViolationClassifier::default().evaluate(&snapshot);
        if snapshot.has_encroachment() {
            prop_assert_eq!(verdict.category, ViolationCategory::Encroachment);
        } else {
            prop_assert_ne!(verdict.category, ViolationCategory::Encroachment);
        }
    }

    #[test]
    fn construction_verdicts_exceed_threshold(snapshot in snapshot_strategy()) {
        let verdict = ViolationClassifier::default().evaluate(&snapshot);
        if verdict.category == ViolationCategory::IllegalConstruction {
            prop_assert!(snapshot.construction_ratio() > 1.10);
        }
    }
}
