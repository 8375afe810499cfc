// Encroachment of detected activity footprints against approved boundaries.

use landwatch_core::types::GeoShape;
use landwatch_geometry::{GeometryEngine, GeometryError};

use super::common::{origin, rect, SIDE};

fn within(actual: f64, expected: f64, rel: f64) -> bool {
    (actual - expected).abs() <= expected.abs() * rel
}

#[test]
fn test_footprint_inside_approval_is_clean() {
    let engine = GeometryEngine::new();
    let (x, y) = origin(1);
    let approved = rect(x, y, SIDE, SIDE);
    let detected = rect(x + SIDE / 4.0, y + SIDE / 4.0, SIDE / 2.0, SIDE / 2.0);

    let result = engine.encroachment(&approved, &detected).unwrap();
    assert!(!result.detected);
    assert_eq!(result.area_m2, 0.0);
    assert!(result.geometry.is_none());
}

#[test]
fn test_footprint_matching_boundary_is_clean() {
    let engine = GeometryEngine::new();
    let (x, y) = origin(1);
    let approved = rect(x, y, SIDE, SIDE);
    assert!(!engine.encroachment(&approved, &approved).unwrap().detected);
}

#[test]
fn test_spill_over_one_edge() {
    let engine = GeometryEngine::new();
    let (x, y) = origin(1);
    let approved = rect(x, y, SIDE, SIDE);
    // A quarter of the footprint sticks out to the east.
    let detected = rect(x + SIDE * 0.5, y, SIDE * 0.667, SIDE);

    let result = engine.encroachment(&approved, &detected).unwrap();
    assert!(result.detected);
    let outside = engine.area(&rect(x + SIDE, y, SIDE * 0.167, SIDE)).unwrap();
    assert!(within(result.area_m2, outside, 0.01), "{} vs {}", result.area_m2, outside);

    let evidence = result.geometry.unwrap();
    assert!(engine.intersects(&detected, &evidence).unwrap());
    assert!(!engine.intersects(&approved, &engine.buffer(&evidence, -0.5).unwrap()).unwrap());
}

#[test]
fn test_multi_plot_approval_with_bridging_footprint() {
    let engine = GeometryEngine::new();
    let (x, y) = origin(1);
    let gap = SIDE / 2.0;
    let approved = GeoShape::MultiPolygon(vec![
        vec![vec![[x, y], [x + SIDE, y], [x + SIDE, y + SIDE], [x, y + SIDE], [x, y]]],
        vec![vec![
            [x + SIDE + gap, y],
            [x + 2.0 * SIDE + gap, y],
            [x + 2.0 * SIDE + gap, y + SIDE],
            [x + SIDE + gap, y + SIDE],
            [x + SIDE + gap, y],
        ]],
    ]);
    let detected = rect(x, y, 2.0 * SIDE + gap, SIDE);

    let result = engine.encroachment(&approved, &detected).unwrap();
    assert!(result.detected);
    let expected = engine.area(&rect(x + SIDE, y, gap, SIDE)).unwrap();
    assert!(within(result.area_m2, expected, 0.01));
}

#[test]
fn test_building_over_unapproved_courtyard() {
    let engine = GeometryEngine::new();
    let (x, y) = origin(1);
    let q = SIDE / 4.0;
    let approved = GeoShape::Polygon(vec![
        vec![[x, y], [x + SIDE, y], [x + SIDE, y + SIDE], [x, y + SIDE], [x, y]],
        vec![
            [x + q, y + q],
            [x + q, y + 3.0 * q],
            [x + 3.0 * q, y + 3.0 * q],
            [x + 3.0 * q, y + q],
            [x + q, y + q],
        ],
    ]);
    let detected = rect(x, y, SIDE, SIDE);

    let result = engine.encroachment(&approved, &detected).unwrap();
    assert!(result.detected);
    let courtyard = engine.area(&rect(x + q, y + q, 2.0 * q, 2.0 * q)).unwrap();
    assert!(within(result.area_m2, courtyard, 0.01));
}

#[test]
fn test_malformed_footprint_is_an_error() {
    let engine = GeometryEngine::new();
    let (x, y) = origin(1);
    let approved = rect(x, y, SIDE, SIDE);
    let bowtie = GeoShape::polygon(vec![
        [x, y],
        [x + SIDE, y + SIDE],
        [x + SIDE, y],
        [x, y + SIDE],
        [x, y],
    ]);
    assert!(matches!(
        engine.encroachment(&approved, &bowtie),
        Err(GeometryError::SelfIntersection { .. })
    ));
}

#[test]
fn test_overlap_percentage_of_partial_footprint() {
    let engine = GeometryEngine::new();
    let (x, y) = origin(1);
    let approved = rect(x, y, SIDE, SIDE);
    let detected = rect(x + SIDE * 0.75, y, SIDE, SIDE);
    let pct = engine.overlap_percentage(&detected, &approved).unwrap();
    assert!((pct - 25.0).abs() < 0.5, "{pct}");
}
