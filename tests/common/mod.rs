/// Shared test helpers for all landwatch integration tests.
///
/// Import from any integration test file with:
///   `#[path = "common/mod.rs"] mod common;`
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use landwatch_core::types::{GeoShape, InferenceMetrics, LandUse, Parcel};
use tempfile::TempDir;

/// Width of a test parcel in degrees (about 104 m x 111 m near 21°N).
#[allow(dead_code)]
pub const SIDE: f64 = 0.001;

/// Axis-aligned lon/lat rectangle, counter-clockwise, closed.
#[allow(dead_code)]
pub fn rect(x: f64, y: f64, w: f64, h: f64) -> GeoShape {
    GeoShape::polygon(vec![[x, y], [x + w, y], [x + w, y + h], [x, y + h], [x, y]])
}

/// South-west corner of the i-th test parcel; parcels sit 0.01° apart.
#[allow(dead_code)]
pub fn origin(i: usize) -> (f64, f64) {
    (81.60 + 0.01 * i as f64, 21.20)
}

#[allow(dead_code)]
pub fn test_parcel(i: usize) -> Parcel {
    let (x, y) = origin(i);
    Parcel {
        id: format!("P-{i}"),
        boundary: rect(x, y, SIDE, SIDE),
        approved_area: 11_500.0,
        land_use: LandUse::Industrial,
        active: true,
        industry_name: Some(format!("Unit {i}")),
        owner_name: None,
    }
}

/// Metrics of a busy, fully compliant plot.
#[allow(dead_code)]
pub fn compliant_metrics() -> InferenceMetrics {
    InferenceMetrics {
        built_up_area: 10_000.0,
        built_up_percentage: 87.0,
        heat_signature_area: 2_300.0,
        heat_percentage: 20.0,
        change_score: 0.2,
        mean_ndvi: 0.1,
        mean_ndbi: 0.3,
    }
}

/// Write `<parcel_id>.json` into an observation directory.
#[allow(dead_code)]
pub fn write_observation(
    dir: &Path,
    parcel_id: &str,
    metrics: &InferenceMetrics,
    detected: Option<&GeoShape>,
) {
    let body = serde_json::json!({
        "metrics": metrics,
        "detected": detected,
    });
    fs::write(
        dir.join(format!("{parcel_id}.json")),
        serde_json::to_string_pretty(&body).unwrap(),
    )
    .unwrap();
}

/// Get path to compiled landwatch binary.
///
/// Builds the binary if it doesn't exist yet.
#[allow(dead_code)]
pub fn landwatch_bin() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove 'deps'
    path.push("landwatch");
    if !path.exists() {
        let status = Command::new("cargo")
            .args(["build", "-p", "landwatch-cli"])
            .status()
            .expect("Failed to build landwatch");
        assert!(status.success(), "Failed to build landwatch binary");
    }
    path
}

/// Run the landwatch binary in `dir`.
#[allow(dead_code)]
pub fn landwatch(dir: &Path, args: &[&str]) -> Output {
    Command::new(landwatch_bin())
        .args(args)
        .current_dir(dir)
        .env_remove("LANDWATCH_LOG")
        .env_remove("LANDWATCH_OBSERVATIONS")
        .output()
        .unwrap()
}

/// A temp directory with `landwatch init` already run.
#[allow(dead_code)]
pub fn initialized_workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    let out = landwatch(dir.path(), &["init"]);
    assert!(
        out.status.success(),
        "init failed: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    dir
}

/// Create an in-memory SqliteParcelStore for testing.
#[allow(dead_code)]
pub fn in_memory_store() -> landwatch_core::sqlite::SqliteParcelStore {
    landwatch_core::sqlite::SqliteParcelStore::in_memory()
        .expect("Failed to create in-memory SqliteParcelStore")
}
