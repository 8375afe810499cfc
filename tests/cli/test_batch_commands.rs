// `run`, `job`, `verdicts`, and `classify` end to end over observation files.

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use super::common::{
    compliant_metrics, initialized_workspace, landwatch, origin, rect, test_parcel,
    write_observation, SIDE,
};

/// Workspace with P-1..P-3 registered. P-2's footprint spills half a plot.
fn survey() -> TempDir {
    let dir = initialized_workspace();
    let parcels: Vec<_> = (1..=3).map(test_parcel).collect();
    fs::write(
        dir.path().join("plots.json"),
        serde_json::to_string(&parcels).unwrap(),
    )
    .unwrap();
    let out = landwatch(dir.path(), &["parcel", "add", "plots.json"]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let obs = dir.path().join("obs");
    fs::create_dir(&obs).unwrap();
    for i in 1..=3 {
        let (x, y) = origin(i);
        let shift = if i == 2 { SIDE / 2.0 } else { 0.0 };
        write_observation(
            &obs,
            &format!("P-{i}"),
            &compliant_metrics(),
            Some(&rect(x + shift, y, SIDE, SIDE)),
        );
    }
    dir
}

fn json(dir: &Path, args: &[&str]) -> (Option<i32>, serde_json::Value) {
    let mut full = vec!["--json"];
    full.extend_from_slice(args);
    let out = landwatch(dir, &full);
    let value = serde_json::from_slice(&out.stdout).unwrap_or_else(|e| {
        panic!(
            "{args:?}: {e}\nstdout: {}\nstderr: {}",
            String::from_utf8_lossy(&out.stdout),
            String::from_utf8_lossy(&out.stderr)
        )
    });
    (out.status.code(), value)
}

#[test]
fn test_run_records_job_and_verdicts() {
    let dir = survey();
    let (code, report) = json(
        dir.path(),
        &[
            "run",
            "--parcels",
            "P-1,P-2,P-3",
            "--observations",
            "obs",
            "--workers",
            "2",
            "--created-by",
            "inspector",
        ],
    );
    assert_eq!(code, Some(1), "violations found exits 1");
    assert_eq!(report["status"], "COMPLETED");
    assert_eq!(report["total"], 3);
    assert_eq!(report["processed"], 3);
    assert_eq!(report["violations_found"], 1);
    assert_eq!(report["by_category"]["encroachment"], 1);
    let job_id = report["job_id"].as_i64().unwrap();

    let out = landwatch(dir.path(), &["job", "status", &job_id.to_string()]);
    assert_eq!(out.status.code(), Some(0));
    let text = String::from_utf8_lossy(&out.stdout);
    assert!(text.contains("COMPLETED"));
    assert!(text.contains("created by: inspector"));
    assert!(text.contains("parcels P-1, P-2, P-3"));

    let (code, verdicts) = json(dir.path(), &["verdicts"]);
    assert_eq!(code, Some(0));
    assert_eq!(verdicts["verdicts"].as_array().unwrap().len(), 1);
    assert_eq!(verdicts["verdicts"][0]["parcel_id"], "P-2");
    assert_eq!(verdicts["summary"]["encroachment"], 1);

    let out = landwatch(dir.path(), &["verdicts", "--parcel", "P-2"]);
    assert!(String::from_utf8_lossy(&out.stdout).contains("violation[encroachment]: P-2"));
    let out = landwatch(dir.path(), &["verdicts", "--parcel", "P-1"]);
    assert_eq!(String::from_utf8_lossy(&out.stdout), "No violations recorded.\n");
}

#[test]
fn test_clean_run_exits_zero() {
    let dir = survey();
    let out = landwatch(
        dir.path(),
        &["run", "--parcels", "P-1,P-3", "--observations", "obs"],
    );
    assert_eq!(out.status.code(), Some(0), "{}", String::from_utf8_lossy(&out.stderr));
    let text = String::from_utf8_lossy(&out.stdout);
    assert!(text.contains("COMPLETED: 2/2 parcels"), "{text}");
}

#[test]
fn test_scope_failure_marks_job_failed() {
    let dir = survey();
    let out = landwatch(
        dir.path(),
        &["run", "--parcels", "P-1,P-404", "--observations", "obs"],
    );
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("P-404"));

    let (code, job) = json(dir.path(), &["job", "status", "1"]);
    assert_eq!(code, Some(1));
    assert_eq!(job["status"], "FAILED");
    assert_eq!(job["failure_kind"], "scope");

    let out = landwatch(dir.path(), &["job", "list"]);
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stdout).contains("FAILED"));
}

#[test]
fn test_run_needs_a_scope() {
    let dir = survey();
    let out = landwatch(dir.path(), &["run", "--observations", "obs"]);
    assert_eq!(out.status.code(), Some(2));

    let out = landwatch(dir.path(), &["job", "status", "42"]);
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn test_run_rejects_out_of_range_workers() {
    let dir = survey();
    for workers in ["0", "5000"] {
        let out = landwatch(
            dir.path(),
            &["run", "--parcels", "P-1", "--observations", "obs", "--workers", workers],
        );
        assert_eq!(out.status.code(), Some(2), "--workers {workers}");
        assert!(String::from_utf8_lossy(&out.stderr).contains("between 1 and 1024"));
    }

    let out = landwatch(dir.path(), &["job", "status", "1"]);
    assert_eq!(out.status.code(), Some(2), "no job was submitted");
}

#[test]
fn test_classify_single_parcel() {
    let dir = survey();
    let (code, result) = json(dir.path(), &["classify", "P-2", "--observations", "obs"]);
    assert_eq!(code, Some(1));
    assert_eq!(result["verdict"]["category"], "encroachment");
    assert!(result["verdict"]["evidence"].is_object());

    let out = landwatch(
        dir.path(),
        &[
            "classify",
            "P-1",
            "--observations",
            "obs",
            "--from",
            "2024-01-01",
            "--to",
            "2024-03-31",
        ],
    );
    assert_eq!(out.status.code(), Some(0));
    let text = String::from_utf8_lossy(&out.stdout);
    assert!(text.contains("ok[compliant]: P-1"));
    assert!(text.contains("window: 2024-01-01..2024-03-31"));

    // Classification never writes verdicts.
    let out = landwatch(dir.path(), &["verdicts", "--parcel", "P-2"]);
    assert_eq!(String::from_utf8_lossy(&out.stdout), "No violations recorded.\n");
}
