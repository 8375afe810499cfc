// Shell completion generation needs no workspace.

use tempfile::TempDir;

use super::common::landwatch;

#[test]
fn test_completion_scripts() {
    let dir = TempDir::new().unwrap();
    for shell in ["bash", "zsh", "fish"] {
        let out = landwatch(dir.path(), &["completion", shell]);
        assert!(out.status.success(), "{shell}");
        let script = String::from_utf8_lossy(&out.stdout);
        assert!(script.contains("landwatch"), "{shell}");
        assert!(script.contains("encroach"), "{shell}");
    }
}

#[test]
fn test_completion_unknown_shell() {
    let dir = TempDir::new().unwrap();
    let out = landwatch(dir.path(), &["completion", "tcsh"]);
    assert_eq!(out.status.code(), Some(2));
    assert!(out.stdout.is_empty());
}
