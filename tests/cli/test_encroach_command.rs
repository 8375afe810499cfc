// `landwatch encroach` works on two geometry files without a workspace.

use std::fs;
use std::path::Path;

use landwatch_core::types::GeoShape;
use tempfile::TempDir;

use super::common::{landwatch, origin, rect, SIDE};

fn write_shape(dir: &Path, name: &str, shape: &GeoShape) {
    fs::write(dir.join(name), serde_json::to_string(shape).unwrap()).unwrap();
}

#[test]
fn test_contained_footprint_exits_zero() {
    let dir = TempDir::new().unwrap();
    let (x, y) = origin(1);
    write_shape(dir.path(), "approved.json", &rect(x, y, SIDE, SIDE));
    write_shape(
        dir.path(),
        "detected.json",
        &rect(x + SIDE / 4.0, y + SIDE / 4.0, SIDE / 2.0, SIDE / 2.0),
    );

    let out = landwatch(dir.path(), &["encroach", "approved.json", "detected.json"]);
    assert_eq!(out.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&out.stdout).contains("no encroachment"));
}

#[test]
fn test_spill_over_exits_one_with_measurements() {
    let dir = TempDir::new().unwrap();
    let (x, y) = origin(1);
    write_shape(dir.path(), "approved.json", &rect(x, y, SIDE, SIDE));
    write_shape(dir.path(), "detected.json", &rect(x + SIDE / 2.0, y, SIDE, SIDE));

    let out = landwatch(
        dir.path(),
        &["--json", "encroach", "approved.json", "detected.json", "--parcel-id", "P-1"],
    );
    assert_eq!(out.status.code(), Some(1));
    let check: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(check["parcel_id"], "P-1");
    assert_eq!(check["encroachment"]["detected"], true);
    let overlap = check["overlap_percentage"].as_f64().unwrap();
    assert!((overlap - 50.0).abs() < 0.5, "overlap {overlap}");
    let area = check["encroachment"]["area_m2"].as_f64().unwrap();
    let approved = check["approved_area_m2"].as_f64().unwrap();
    assert!((area / approved - 0.5).abs() < 0.01);
}

#[test]
fn test_invalid_geometry_exits_two() {
    let dir = TempDir::new().unwrap();
    let (x, y) = origin(1);
    write_shape(dir.path(), "approved.json", &rect(x, y, SIDE, SIDE));
    fs::write(dir.path().join("detected.json"), r#"{"type":"Point","coordinates":[1,2]}"#).unwrap();

    let out = landwatch(dir.path(), &["encroach", "approved.json", "detected.json"]);
    assert_eq!(out.status.code(), Some(2));
    assert!(out.stdout.is_empty());
}
