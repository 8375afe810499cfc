// Geodesic area, distance, union and buffer against hand-computed values.

use landwatch_core::types::Parcel;
use landwatch_geometry::{GeometryEngine, GeometryError};

use super::common::{origin, rect, test_parcel, SIDE};

/// 0.001° x 0.001° at 21.2°N on WGS84: 103.83 m x 110.72 m.
const SQUARE_M2: f64 = 11_496.0;
const WIDTH_M: f64 = 103.83;
const HEIGHT_M: f64 = 110.72;

fn within(actual: f64, expected: f64, rel: f64) -> bool {
    (actual - expected).abs() <= expected.abs() * rel
}

#[test]
fn test_square_area() {
    let engine = GeometryEngine::new();
    let (x, y) = origin(1);
    let area = engine.area(&rect(x, y, SIDE, SIDE)).unwrap();
    assert!(within(area, SQUARE_M2, 0.005), "{area}");
}

#[test]
fn test_area_is_winding_independent() {
    let engine = GeometryEngine::new();
    let (x, y) = origin(1);
    let ccw = rect(x, y, SIDE, SIDE);
    let cw = landwatch_core::types::GeoShape::polygon(vec![
        [x, y],
        [x, y + SIDE],
        [x + SIDE, y + SIDE],
        [x + SIDE, y],
        [x, y],
    ]);
    let (a, b) = (engine.area(&ccw).unwrap(), engine.area(&cw).unwrap());
    assert!((a - b).abs() < 1e-6 * a);
}

#[test]
fn test_distance_between_neighbours() {
    let engine = GeometryEngine::new();
    let a = test_parcel(1).boundary;
    let b = test_parcel(2).boundary;
    let gap_m = 0.009 * WIDTH_M / SIDE;
    let d = engine.distance(&a, &b).unwrap();
    assert!(within(d, gap_m, 0.01), "{d} vs {gap_m}");
    assert!(engine.within_distance(&a, &b, gap_m * 1.05).unwrap());
    assert!(!engine.within_distance(&a, &b, gap_m * 0.95).unwrap());
    assert_eq!(engine.distance(&a, &a).unwrap(), 0.0);
}

#[test]
fn test_nearby_orders_by_distance() {
    let engine = GeometryEngine::new();
    let reference = test_parcel(1).boundary;
    let candidates: Vec<Parcel> = [4, 2, 9, 3].into_iter().map(test_parcel).collect();
    let found = engine.nearby(&reference, &candidates, 3_500.0).unwrap();
    let ids: Vec<&str> = found.iter().map(|(p, _)| p.id.as_str()).collect();
    assert_eq!(ids, vec!["P-2", "P-3", "P-4"]);
    assert!(found.windows(2).all(|w| w[0].1 <= w[1].1));
}

#[test]
fn test_union_of_row_of_plots() {
    let engine = GeometryEngine::new();
    let (x, y) = origin(1);
    let row: Vec<_> = (0..12)
        .map(|i| rect(x + SIDE * i as f64, y, SIDE, SIDE))
        .collect();
    let merged = engine.union(&row).unwrap();
    let expected = engine.area(&rect(x, y, SIDE * 12.0, SIDE)).unwrap();
    assert!(within(engine.area(&merged).unwrap(), expected, 1e-4));
    assert!(matches!(engine.union(&[]), Err(GeometryError::Empty)));
}

#[test]
fn test_buffer_grows_and_shrinks() {
    let engine = GeometryEngine::new();
    let (x, y) = origin(1);
    let square = rect(x, y, SIDE, SIDE);

    let grown = engine.area(&engine.buffer(&square, 10.0).unwrap()).unwrap();
    let perimeter = 2.0 * (WIDTH_M + HEIGHT_M);
    let expected = SQUARE_M2 + perimeter * 10.0 + std::f64::consts::PI * 100.0;
    assert!(within(grown, expected, 0.01), "{grown} vs {expected}");

    let shrunk = engine.area(&engine.buffer(&square, -10.0).unwrap()).unwrap();
    let expected = (WIDTH_M - 20.0) * (HEIGHT_M - 20.0);
    assert!(within(shrunk, expected, 0.01), "{shrunk} vs {expected}");
}

#[test]
fn test_buffer_erasing_the_plot_is_reported() {
    let engine = GeometryEngine::new();
    let (x, y) = origin(1);
    assert!(matches!(
        engine.buffer(&rect(x, y, SIDE, SIDE), -60.0),
        Err(GeometryError::Collapsed(_))
    ));
}
