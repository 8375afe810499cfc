// `landwatch init` and `landwatch config` against a real directory.

use std::fs;

use tempfile::TempDir;

use super::common::{initialized_workspace, landwatch};

fn stdout(out: &std::process::Output) -> String {
    String::from_utf8_lossy(&out.stdout).trim().to_string()
}

#[test]
fn test_init_creates_config_and_database() {
    let dir = initialized_workspace();
    let root = dir.path().join(".landwatch");
    assert!(root.join("landwatch.json").exists());
    assert!(root.join("landwatch.db").exists());

    let config: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(root.join("landwatch.json")).unwrap()).unwrap();
    assert_eq!(config["thresholds"]["change_detection_threshold"], 0.7);
    assert_eq!(config["batch"]["workers"], 4);
}

#[test]
fn test_init_twice_is_an_error() {
    let dir = initialized_workspace();
    let out = landwatch(dir.path(), &["init"]);
    assert_eq!(out.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&out.stderr).contains("already exists"));
}

#[test]
fn test_commands_require_init() {
    let dir = TempDir::new().unwrap();
    for args in [
        vec!["parcel", "list"],
        vec!["job", "list"],
        vec!["verdicts"],
        vec!["config"],
    ] {
        let out = landwatch(dir.path(), &args);
        assert_eq!(out.status.code(), Some(2), "{args:?}");
        assert!(
            String::from_utf8_lossy(&out.stderr).contains("not initialized"),
            "{args:?}"
        );
    }
}

#[test]
fn test_config_get_and_set() {
    let dir = initialized_workspace();
    let out = landwatch(dir.path(), &["config", "batch.workers"]);
    assert!(out.status.success());
    assert_eq!(stdout(&out), "4");

    let out = landwatch(dir.path(), &["config", "batch.workers", "8"]);
    assert!(out.status.success());
    let out = landwatch(dir.path(), &["config", "batch.workers"]);
    assert_eq!(stdout(&out), "8");

    let out = landwatch(dir.path(), &["config", "logging.level"]);
    assert_eq!(stdout(&out), "info");
}

#[test]
fn test_config_rejects_unknown_keys_and_bad_values() {
    let dir = initialized_workspace();
    let out = landwatch(dir.path(), &["config", "thresholds.nope"]);
    assert_eq!(out.status.code(), Some(1));

    let out = landwatch(
        dir.path(),
        &["config", "thresholds.change_detection_threshold", "1.5"],
    );
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("invalid value"));

    let out = landwatch(dir.path(), &["config", "batch.workers", "5000"]);
    assert_eq!(out.status.code(), Some(1));

    // The file on disk is untouched.
    let out = landwatch(dir.path(), &["config", "thresholds.change_detection_threshold"]);
    assert_eq!(stdout(&out), "0.7");
}
