// Registering, listing, and retiring parcels through the CLI.

use std::fs;
use std::path::Path;

use landwatch_core::types::{GeoShape, Parcel};

use super::common::{initialized_workspace, landwatch, test_parcel};

fn write_parcels(dir: &Path, name: &str, parcels: &[Parcel]) -> String {
    let path = dir.join(name);
    fs::write(&path, serde_json::to_string_pretty(parcels).unwrap()).unwrap();
    path.to_string_lossy().into_owned()
}

fn listed_ids(dir: &Path, args: &[&str]) -> Vec<String> {
    let out = landwatch(dir, args);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let parcels: Vec<Parcel> = serde_json::from_slice(&out.stdout).unwrap();
    parcels.into_iter().map(|p| p.id).collect()
}

#[test]
fn test_add_list_and_deactivate() {
    let dir = initialized_workspace();
    let file = write_parcels(dir.path(), "plots.json", &[test_parcel(1), test_parcel(2)]);
    let out = landwatch(dir.path(), &["parcel", "add", &file]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    assert_eq!(listed_ids(dir.path(), &["--json", "parcel", "list"]), vec!["P-1", "P-2"]);

    let out = landwatch(dir.path(), &["parcel", "deactivate", "P-1"]);
    assert!(out.status.success());
    assert_eq!(listed_ids(dir.path(), &["--json", "parcel", "list"]), vec!["P-2"]);
    assert_eq!(
        listed_ids(dir.path(), &["--json", "parcel", "list", "--all"]),
        vec!["P-1", "P-2"]
    );

    let out = landwatch(dir.path(), &["parcel", "deactivate", "P-9"]);
    assert_eq!(out.status.code(), Some(1));
}

#[test]
fn test_invalid_boundary_rejects_whole_file() {
    let dir = initialized_workspace();
    let mut broken = test_parcel(2);
    broken.boundary = GeoShape::polygon(vec![
        [81.62, 21.20],
        [81.621, 21.201],
        [81.621, 21.20],
        [81.62, 21.201],
        [81.62, 21.20],
    ]);
    let file = write_parcels(dir.path(), "plots.json", &[test_parcel(1), broken]);

    let out = landwatch(dir.path(), &["parcel", "add", &file]);
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("P-2"));
    assert!(stderr.contains("nothing saved"));

    let out = landwatch(dir.path(), &["parcel", "list"]);
    assert!(out.status.success());
    assert_eq!(String::from_utf8_lossy(&out.stdout), "No parcels registered.\n");
}

#[test]
fn test_unreadable_parcel_file() {
    let dir = initialized_workspace();
    let out = landwatch(dir.path(), &["parcel", "add", "missing.json"]);
    assert_eq!(out.status.code(), Some(2));

    fs::write(dir.path().join("junk.json"), "[1, 2, 3]").unwrap();
    let out = landwatch(dir.path(), &["parcel", "add", "junk.json"]);
    assert_eq!(out.status.code(), Some(1));
}
