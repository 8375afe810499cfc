// Batch runs reading observation files and persisting to an on-disk store.

use std::sync::{Arc, Mutex};

use landwatch_core::config::LandwatchConfig;
use landwatch_core::sqlite::SqliteParcelStore;
use landwatch_core::store::ParcelStore;
use landwatch_core::types::{
    FailureKind, GeoShape, InferenceMetrics, JobScope, JobStatus, OutcomeKind, ParcelOutcome,
    ViolationCategory,
};
use landwatch_enforce::coordinator::SharedStore;
use landwatch_enforce::job::{transition, JobError};
use landwatch_enforce::provider_file::FileProvider;
use landwatch_enforce::{BatchCoordinator, CancelToken};
use tempfile::TempDir;

use super::common::{compliant_metrics, origin, rect, test_parcel, write_observation, SIDE};

struct Site {
    _dir: TempDir,
    db: String,
    observations: std::path::PathBuf,
}

fn site(parcels: usize) -> Site {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("landwatch.db").to_string_lossy().into_owned();
    let observations = dir.path().join("observations");
    std::fs::create_dir_all(&observations).unwrap();

    let mut store = SqliteParcelStore::open(&db).unwrap();
    for i in 1..=parcels {
        store.save_parcel(&test_parcel(i)).unwrap();
    }
    Site {
        _dir: dir,
        db,
        observations,
    }
}

fn open_store(site: &Site) -> SharedStore {
    Arc::new(Mutex::new(SqliteParcelStore::open(&site.db).unwrap()))
}

fn coordinator(site: &Site, store: &SharedStore) -> BatchCoordinator {
    let provider = Arc::new(FileProvider::new(&site.observations));
    let mut config = LandwatchConfig::default();
    config.batch.workers = 3;
    config.batch.retry_backoff_ms = 1;
    BatchCoordinator::from_config(Arc::clone(store), provider.clone(), provider, &config)
}

fn scope(ids: &[&str]) -> JobScope {
    JobScope::Parcels {
        ids: ids.iter().map(|id| id.to_string()).collect(),
    }
}

fn bowtie(i: usize) -> GeoShape {
    let (x, y) = origin(i);
    GeoShape::polygon(vec![[x, y], [x + SIDE, y + SIDE], [x + SIDE, y], [x, y + SIDE], [x, y]])
}

#[tokio::test]
async fn test_batch_over_observation_files() {
    let site = site(5);
    for i in [1, 2, 5] {
        let (x, y) = origin(i);
        write_observation(
            &site.observations,
            &format!("P-{i}"),
            &compliant_metrics(),
            Some(&rect(x, y, SIDE, SIDE)),
        );
    }
    // Footprint spills half a plot east.
    let (x, y) = origin(3);
    write_observation(
        &site.observations,
        "P-3",
        &compliant_metrics(),
        Some(&rect(x + SIDE / 2.0, y, SIDE, SIDE)),
    );
    // Self-intersecting footprint.
    write_observation(&site.observations, "P-4", &compliant_metrics(), Some(&bowtie(4)));

    let store = open_store(&site);
    let coordinator = coordinator(&site, &store);
    let job_id = coordinator
        .submit(scope(&["P-1", "P-2", "P-3", "P-4", "P-5"]), Some("inspector".into()))
        .unwrap();
    let report = coordinator.run(job_id, CancelToken::new()).await.unwrap();

    assert_eq!(report.status, JobStatus::Completed);
    assert_eq!((report.total, report.processed, report.failed), (5, 5, 1));
    assert_eq!(report.violations_found, 1);
    assert_eq!(report.failures[0].parcel_id, "P-4");
    assert_eq!(report.failures[0].kind, "geometry");
    assert_eq!(report.by_category.get(&ViolationCategory::Encroachment), Some(&1));
    assert_eq!(report.by_category.get(&ViolationCategory::Compliant), Some(&3));

    // Everything written survives reopening the database.
    drop(coordinator);
    drop(store);
    let reopened = SqliteParcelStore::open(&site.db).unwrap();
    let job = reopened.find_job(job_id).unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.created_by.as_deref(), Some("inspector"));
    let verdicts = reopened.verdicts_for_parcel("P-3").unwrap();
    assert_eq!(verdicts.len(), 1);
    assert_eq!(verdicts[0].category, ViolationCategory::Encroachment);
    assert!(reopened.verdicts_for_parcel("P-1").unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_and_malformed_observations_fail_alone() {
    let site = site(3);
    write_observation(&site.observations, "P-1", &compliant_metrics(), None);
    std::fs::write(site.observations.join("P-2.json"), "{ not json").unwrap();

    let store = open_store(&site);
    let coordinator = coordinator(&site, &store);
    let job_id = coordinator.submit(scope(&["P-1", "P-2", "P-3"]), None).unwrap();
    let report = coordinator.run(job_id, CancelToken::new()).await.unwrap();

    assert_eq!(report.status, JobStatus::Completed);
    assert_eq!(report.failed, 2);
    let mut failed: Vec<_> = report
        .failures
        .iter()
        .map(|f| (f.parcel_id.as_str(), f.kind.as_str()))
        .collect();
    failed.sort();
    assert_eq!(failed, vec![("P-2", "provider"), ("P-3", "provider")]);
}

#[tokio::test]
async fn test_rerun_after_restart_resumes_remaining_parcels() {
    let site = site(4);
    for i in 1..=4 {
        write_observation(&site.observations, &format!("P-{i}"), &compliant_metrics(), None);
    }

    // First process: the job got as far as two parcels before dying.
    let job_id = {
        let store = open_store(&site);
        let coordinator = coordinator(&site, &store);
        let job_id = coordinator
            .submit(scope(&["P-1", "P-2", "P-3", "P-4"]), None)
            .unwrap();
        let mut guard = store.lock().unwrap();
        let mut job = guard.find_job(job_id).unwrap().unwrap();
        job.total_plots = 4;
        transition(&mut *guard, &mut job, JobStatus::Running).unwrap();
        for id in ["P-1", "P-2"] {
            guard
                .record_outcome(
                    job_id,
                    &ParcelOutcome {
                        parcel_id: id.into(),
                        kind: OutcomeKind::Compliant,
                        category: Some(ViolationCategory::Compliant),
                        message: None,
                    },
                )
                .unwrap();
        }
        job_id
    };

    // The earlier outcomes stand even if their inputs have since changed.
    write_observation(
        &site.observations,
        "P-1",
        &InferenceMetrics {
            change_score: 0.99,
            ..compliant_metrics()
        },
        None,
    );

    let store = open_store(&site);
    let coordinator = coordinator(&site, &store);
    assert_eq!(coordinator.status(job_id).unwrap().status, JobStatus::Running);
    let report = coordinator.run(job_id, CancelToken::new()).await.unwrap();

    assert_eq!(report.status, JobStatus::Completed);
    assert_eq!(report.skipped, 2);
    assert_eq!(report.processed, 4);
    assert_eq!(report.violations_found, 0);
    assert_eq!(report.failure_kind, None::<FailureKind>);
    assert_eq!(store.lock().unwrap().outcomes_for_job(job_id).unwrap().len(), 4);
}

#[tokio::test]
async fn test_job_leased_by_another_connection_is_refused() {
    let site = site(2);
    for i in 1..=2 {
        write_observation(&site.observations, &format!("P-{i}"), &compliant_metrics(), None);
    }
    let store = open_store(&site);
    let coordinator = coordinator(&site, &store);
    let job_id = coordinator.submit(scope(&["P-1", "P-2"]), None).unwrap();

    // Another process holds the job on its own connection.
    let mut other = SqliteParcelStore::open(&site.db).unwrap();
    let now = chrono::Utc::now();
    assert!(other
        .acquire_lease(job_id, "landwatch-elsewhere", now, now + chrono::Duration::hours(1))
        .unwrap());

    assert!(matches!(
        coordinator.run(job_id, CancelToken::new()).await,
        Err(JobError::AlreadyRunning(id)) if id == job_id
    ));
    assert_eq!(other.find_job(job_id).unwrap().unwrap().status, JobStatus::Pending);
    assert!(other.outcomes_for_job(job_id).unwrap().is_empty());

    other.release_lease(job_id, "landwatch-elsewhere").unwrap();
    let report = coordinator.run(job_id, CancelToken::new()).await.unwrap();
    assert_eq!(report.status, JobStatus::Completed);
    assert_eq!(report.processed, 2);
}

#[tokio::test]
async fn test_two_coordinators_never_share_a_run() {
    let site = site(4);
    for i in 1..=4 {
        write_observation(&site.observations, &format!("P-{i}"), &compliant_metrics(), None);
    }
    let first_store = open_store(&site);
    let second_store = open_store(&site);
    let first = coordinator(&site, &first_store);
    let second = coordinator(&site, &second_store);
    let job_id = first
        .submit(scope(&["P-1", "P-2", "P-3", "P-4"]), None)
        .unwrap();

    let (a, b) = tokio::join!(
        first.run(job_id, CancelToken::new()),
        second.run(job_id, CancelToken::new())
    );
    let (done, refused) = match (a, b) {
        (Ok(report), Err(e)) | (Err(e), Ok(report)) => (report, e),
        (a, b) => panic!("expected exactly one run, got {a:?} and {b:?}"),
    };
    assert!(
        matches!(refused, JobError::AlreadyRunning(_) | JobError::InvalidTransition { .. }),
        "{refused:?}"
    );
    assert_eq!(done.status, JobStatus::Completed);
    assert_eq!(done.processed, 4);
    assert_eq!(done.skipped, 0);
    let outcomes = first_store.lock().unwrap().outcomes_for_job(job_id).unwrap();
    assert_eq!(outcomes.len(), 4);
}
