//! `landwatch run` -- submit (or resume) a batch job and drive it to the end.
//!
//! Ctrl-C cancels the run: no new parcels are dispatched, in-flight parcels
//! finish, and the job ends FAILED with failure kind `cancelled`.

use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use landwatch_core::config::MAX_WORKERS;
use landwatch_core::types::{DateWindow, JobId, JobScope, JobStatus};
use landwatch_enforce::coordinator::SharedStore;
use landwatch_enforce::job::JobError;
use landwatch_enforce::provider_file::FileProvider;
use landwatch_enforce::{BatchCoordinator, CancelToken};
use landwatch_output::OutputFormatter;

use super::workspace::{runtime, Workspace};

pub struct RunArgs {
    pub parcels: Vec<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub job: Option<JobId>,
    pub observations: String,
    pub workers: Option<usize>,
    pub created_by: Option<String>,
}

/// Exits 0 when the job completed without violations, 1 when it found
/// violations or failed, 2 on usage or environment errors.
pub fn run(formatter: &dyn OutputFormatter, verbose: bool, args: RunArgs) -> i32 {
    let ws = match Workspace::open("run") {
        Ok(ws) => ws,
        Err(code) => return code,
    };
    let mut config = ws.config.clone();
    if let Some(workers) = args.workers {
        if !(1..=MAX_WORKERS).contains(&workers) {
            eprintln!("landwatch run: --workers must be between 1 and {}", MAX_WORKERS);
            return 2;
        }
        config.batch.workers = workers;
    }
    let store: SharedStore = match ws.store("run") {
        Ok(s) => Arc::new(Mutex::new(s)),
        Err(code) => return code,
    };

    let provider = Arc::new(FileProvider::new(&args.observations));
    let coordinator = BatchCoordinator::from_config(store, provider.clone(), provider, &config);

    let job_id = match args.job {
        Some(id) => id,
        None => {
            let scope = match scope_from_args(args.parcels, args.from, args.to) {
                Some(scope) => scope,
                None => {
                    eprintln!("landwatch run: specify --parcels, --from/--to, or --job");
                    return 2;
                }
            };
            match coordinator.submit(scope, args.created_by) {
                Ok(id) => id,
                Err(e) => {
                    eprintln!("landwatch run: failed to submit job: {}", e);
                    return 2;
                }
            }
        }
    };
    if verbose {
        eprintln!(
            "landwatch run: job #{} with {} worker(s), observations from {}",
            job_id, config.batch.workers, args.observations
        );
    }

    let rt = match runtime("run") {
        Ok(rt) => rt,
        Err(code) => return code,
    };
    let outcome = rt.block_on(async {
        let cancel = CancelToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupt received, finishing in-flight parcels");
                trigger.cancel();
            }
        });
        coordinator.run(job_id, cancel).await
    });

    match outcome {
        Ok(report) => {
            print!("{}", formatter.format_run(&report));
            if report.status == JobStatus::Failed || report.violations_found > 0 {
                1
            } else {
                0
            }
        }
        Err(JobError::Scope(reason)) => {
            eprintln!("landwatch run: job #{} failed: {}", job_id, reason);
            1
        }
        Err(e) => {
            eprintln!("landwatch run: {}", e);
            2
        }
    }
}

/// A date range wins over a parcel list; clap already rejects both at once.
fn scope_from_args(
    parcels: Vec<String>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Option<JobScope> {
    match (from, to) {
        (Some(start), Some(end)) => Some(JobScope::DateRange {
            window: DateWindow::new(start, end),
        }),
        _ if !parcels.is_empty() => Some(JobScope::Parcels { ids: parcels }),
        _ => None,
    }
}
