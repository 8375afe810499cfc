use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::Utc;
use landwatch_core::config::{LandwatchConfig, MAX_WORKERS};
use landwatch_core::snapshot::DetectionSnapshot;
use landwatch_core::store::ParcelStore;
use landwatch_core::types::{
    AnalysisJob, DateWindow, FailureKind, JobId, JobScope, JobStatus, OutcomeKind, Parcel,
    ParcelOutcome, StoreError, ViolationCategory, ViolationVerdict,
};
use serde::Serialize;
use tokio::sync::{watch, Semaphore};
use tokio::task::JoinSet;

use crate::job::{transition, JobError, JobTracker};
use crate::pipeline::{EvaluationError, Pipeline};
use crate::provider::{GeometryProvider, InferenceProvider};
use crate::retry::RetryPolicy;

/// Store handle shared by the coordinator and its workers. The lock is only
/// ever held for synchronous store calls, never across an await.
pub type SharedStore = Arc<Mutex<dyn ParcelStore + Send>>;

/// Imagery window length for jobs scoped by explicit parcel ids.
pub const DEFAULT_LOOKBACK_DAYS: u32 = 90;

/// How long a run lease survives without being renewed. Renewed after every
/// finished parcel.
pub const DEFAULT_LEASE_TTL: Duration = Duration::from_secs(600);

/// Failure kind reported for parcels that failed in an earlier, interrupted run.
const EARLIER_RUN: &str = "earlier_run";

static NEXT_HOLDER: AtomicU64 = AtomicU64::new(0);

/// Lease holder name unique to this coordinator instance.
fn holder_id() -> String {
    format!(
        "pid{}-{}",
        std::process::id(),
        NEXT_HOLDER.fetch_add(1, Ordering::Relaxed)
    )
}

fn lock(
    store: &SharedStore,
) -> Result<MutexGuard<'_, dyn ParcelStore + Send + 'static>, StoreError> {
    store
        .lock()
        .map_err(|_| StoreError::Internal("store lock poisoned".to_string()))
}

fn count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

/// Cooperative cancellation flag for a batch run.
///
/// Cancelling stops dispatch of new parcels; evaluations already in flight
/// are allowed to finish.
#[derive(Debug, Clone)]
pub struct CancelToken {
    sender: Arc<watch::Sender<bool>>,
    receiver: watch::Receiver<bool>,
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelToken {
    pub fn new() -> Self {
        let (sender, receiver) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
            receiver,
        }
    }

    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Resolves once the token has been cancelled.
    pub async fn cancelled(&self) {
        let mut receiver = self.receiver.clone();
        // The sender lives as long as any clone of the token, so this only
        // returns once the flag is set.
        let _ = receiver.wait_for(|cancelled| *cancelled).await;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParcelFailure {
    pub parcel_id: String,
    pub kind: String,
    pub message: String,
}

/// Summary of one run of a job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub job_id: JobId,
    pub status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_kind: Option<FailureKind>,
    pub total: u32,
    pub processed: u32,
    pub succeeded: u32,
    pub failed: u32,
    /// Parcels already processed by an earlier run of this job.
    pub skipped: u32,
    pub violations_found: u32,
    pub failures: Vec<ParcelFailure>,
    pub by_category: BTreeMap<ViolationCategory, u32>,
}

impl RunReport {
    fn from_outcomes(
        job: &AnalysisJob,
        skipped: u32,
        outcomes: &[ParcelOutcome],
        kinds: &HashMap<String, &'static str>,
    ) -> Self {
        let mut by_category = BTreeMap::new();
        let mut failures = Vec::new();
        let mut violations = 0;
        for outcome in outcomes {
            if let Some(category) = outcome.category {
                *by_category.entry(category).or_insert(0) += 1;
            }
            match outcome.kind {
                OutcomeKind::Violation => violations += 1,
                OutcomeKind::Failed => failures.push(ParcelFailure {
                    parcel_id: outcome.parcel_id.clone(),
                    kind: kinds
                        .get(&outcome.parcel_id)
                        .copied()
                        .unwrap_or(EARLIER_RUN)
                        .to_string(),
                    message: outcome.message.clone().unwrap_or_default(),
                }),
                OutcomeKind::Compliant => {}
            }
        }
        let processed = count(outcomes.len());
        let failed = count(failures.len());
        RunReport {
            job_id: job.id,
            status: job.status,
            failure_kind: job.failure_kind,
            total: job.total_plots,
            processed,
            succeeded: processed - failed,
            failed,
            skipped,
            violations_found: violations,
            failures,
            by_category,
        }
    }
}

/// Live counters for parcels finished during the current run.
#[derive(Debug, Default)]
struct Counters {
    processed: AtomicU32,
    failed: AtomicU32,
    violations: AtomicU32,
}

/// Counts restored from an earlier run of the same job.
#[derive(Debug, Clone, Copy, Default)]
struct Baseline {
    processed: u32,
    failed: u32,
    violations: u32,
}

/// Result a worker hands back to the dispatcher.
struct WorkerResult {
    parcel_id: String,
    failure_kind: Option<&'static str>,
}

/// Evaluates one parcel and records its outcome.
#[derive(Clone)]
struct ParcelWorker {
    store: SharedStore,
    pipeline: Arc<Pipeline>,
    counters: Arc<Counters>,
}

impl ParcelWorker {
    async fn process(self, job_id: JobId, parcel: Parcel, window: DateWindow) -> WorkerResult {
        let evaluated = self.pipeline.evaluate(&parcel, &window).await;
        let (outcome, failure_kind) = match &evaluated {
            Ok((_, verdict)) => (
                ParcelOutcome {
                    parcel_id: parcel.id.clone(),
                    kind: if verdict.is_violation() {
                        OutcomeKind::Violation
                    } else {
                        OutcomeKind::Compliant
                    },
                    category: Some(verdict.category),
                    message: None,
                },
                None,
            ),
            Err(e) => {
                tracing::warn!(
                    job_id,
                    parcel = %parcel.id,
                    kind = e.kind(),
                    error = %e,
                    "parcel evaluation failed"
                );
                (failed_outcome(&parcel.id, e), Some(e.kind()))
            }
        };

        let recorded = match self.persist(job_id, evaluated.as_ref().ok(), &outcome) {
            Ok(recorded) => Ok((recorded, outcome.kind, failure_kind)),
            Err(e) => {
                tracing::error!(job_id, parcel = %parcel.id, error = %e, "failed to persist parcel result");
                let fallback = ParcelOutcome {
                    parcel_id: parcel.id.clone(),
                    kind: OutcomeKind::Failed,
                    category: None,
                    message: Some(format!("store: {e}")),
                };
                self.persist(job_id, None, &fallback)
                    .map(|recorded| (recorded, OutcomeKind::Failed, Some("store")))
            }
        };

        match recorded {
            Ok((true, kind, failure_kind)) => {
                self.counters.processed.fetch_add(1, Ordering::SeqCst);
                match kind {
                    OutcomeKind::Failed => {
                        self.counters.failed.fetch_add(1, Ordering::SeqCst);
                    }
                    OutcomeKind::Violation => {
                        self.counters.violations.fetch_add(1, Ordering::SeqCst);
                    }
                    OutcomeKind::Compliant => {}
                }
                WorkerResult {
                    parcel_id: parcel.id,
                    failure_kind,
                }
            }
            Ok((false, _, failure_kind)) => {
                tracing::debug!(job_id, parcel = %parcel.id, "outcome already recorded");
                WorkerResult {
                    parcel_id: parcel.id,
                    failure_kind,
                }
            }
            Err(e) => {
                tracing::error!(job_id, parcel = %parcel.id, error = %e, "parcel outcome lost");
                WorkerResult {
                    parcel_id: parcel.id,
                    failure_kind: Some("store"),
                }
            }
        }
    }

    fn persist(
        &self,
        job_id: JobId,
        evaluated: Option<&(DetectionSnapshot, ViolationVerdict)>,
        outcome: &ParcelOutcome,
    ) -> Result<bool, StoreError> {
        let mut store = lock(&self.store)?;
        if let Some((snapshot, verdict)) = evaluated {
            store.save_snapshot(job_id, snapshot)?;
            if verdict.is_violation() {
                store.save_verdict(job_id, verdict)?;
            }
        }
        store.record_outcome(job_id, outcome)
    }
}

fn failed_outcome(parcel_id: &str, error: &EvaluationError) -> ParcelOutcome {
    ParcelOutcome {
        parcel_id: parcel_id.to_string(),
        kind: OutcomeKind::Failed,
        category: None,
        message: Some(error.to_string()),
    }
}

/// Runs the evaluation pipeline over a job's scope on a bounded worker pool.
///
/// A failing parcel is recorded and counted, never fatal to the batch. A run
/// interrupted by a crash leaves the job RUNNING; running it again skips
/// every parcel that already has a recorded outcome.
pub struct BatchCoordinator {
    store: SharedStore,
    pipeline: Arc<Pipeline>,
    workers: usize,
    lookback_days: u32,
    tracker: JobTracker,
    holder: String,
    lease_ttl: Duration,
}

impl BatchCoordinator {
    pub fn new(store: SharedStore, pipeline: Pipeline, workers: usize) -> Self {
        Self {
            store,
            pipeline: Arc::new(pipeline),
            workers: workers.clamp(1, MAX_WORKERS),
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            tracker: JobTracker::new(),
            holder: holder_id(),
            lease_ttl: DEFAULT_LEASE_TTL,
        }
    }

    /// Wire up a coordinator with the default engine and a classifier built
    /// from the configured thresholds.
    pub fn from_config(
        store: SharedStore,
        inference: Arc<dyn InferenceProvider>,
        footprints: Arc<dyn GeometryProvider>,
        config: &LandwatchConfig,
    ) -> Self {
        let pipeline = Pipeline::new(
            inference,
            footprints,
            config.thresholds,
            RetryPolicy::from_config(&config.batch),
        );
        Self::new(store, pipeline, config.batch.workers)
    }

    pub fn with_lookback_days(mut self, days: u32) -> Self {
        self.lookback_days = days;
        self
    }

    pub fn with_lease_ttl(mut self, ttl: Duration) -> Self {
        self.lease_ttl = ttl;
        self
    }

    /// Share run claims with other coordinators over the same store.
    pub fn with_tracker(mut self, tracker: JobTracker) -> Self {
        self.tracker = tracker;
        self
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Persist a new PENDING job.
    pub fn submit(&self, scope: JobScope, created_by: Option<String>) -> Result<JobId, JobError> {
        let job = AnalysisJob::pending(scope, created_by);
        let id = lock(&self.store)?.create_job(&job)?;
        tracing::info!(job_id = id, "job submitted");
        Ok(id)
    }

    pub fn status(&self, job_id: JobId) -> Result<AnalysisJob, JobError> {
        lock(&self.store)?
            .find_job(job_id)?
            .ok_or(JobError::NotFound(job_id))
    }

    pub fn verdicts_for_job(&self, job_id: JobId) -> Result<Vec<ViolationVerdict>, JobError> {
        Ok(lock(&self.store)?.verdicts_for_job(job_id)?)
    }

    /// Evaluate one parcel outside of any job. Nothing is persisted.
    pub async fn evaluate_parcel(
        &self,
        parcel: &Parcel,
        window: &DateWindow,
    ) -> Result<(DetectionSnapshot, ViolationVerdict), EvaluationError> {
        self.pipeline.evaluate(parcel, window).await
    }

    fn resolve_scope(&self, scope: &JobScope) -> Result<(Vec<Parcel>, DateWindow), JobError> {
        let store = lock(&self.store)?;
        match scope {
            JobScope::Parcels { ids } => {
                if ids.is_empty() {
                    return Err(JobError::Scope("no parcels in scope".to_string()));
                }
                let mut seen = HashSet::new();
                let mut parcels = Vec::new();
                let mut unknown = Vec::new();
                let mut inactive = Vec::new();
                for id in ids {
                    if !seen.insert(id.as_str()) {
                        continue;
                    }
                    match store.find_parcel(id)? {
                        None => unknown.push(id.as_str()),
                        Some(p) if !p.active => inactive.push(id.as_str()),
                        Some(p) => parcels.push(p),
                    }
                }
                let mut problems = Vec::new();
                if !unknown.is_empty() {
                    problems.push(format!("unknown parcels: {}", unknown.join(", ")));
                }
                if !inactive.is_empty() {
                    problems.push(format!("inactive parcels: {}", inactive.join(", ")));
                }
                if !problems.is_empty() {
                    return Err(JobError::Scope(problems.join("; ")));
                }
                let window = DateWindow::trailing(Utc::now().date_naive(), self.lookback_days);
                Ok((parcels, window))
            }
            JobScope::DateRange { window } => {
                if !window.is_ordered() {
                    return Err(JobError::Scope(format!(
                        "date range {window} ends before it starts"
                    )));
                }
                let parcels = store.list_parcels(true)?;
                if parcels.is_empty() {
                    return Err(JobError::Scope("no active parcels".to_string()));
                }
                Ok((parcels, *window))
            }
        }
    }

    fn fail_scope(&self, job: &mut AnalysisJob, reason: &str) -> Result<(), JobError> {
        job.failure_kind = Some(FailureKind::Scope);
        job.error_message = Some(reason.to_string());
        let mut store = lock(&self.store)?;
        transition(&mut *store, job, JobStatus::Failed)?;
        tracing::warn!(job_id = job.id, reason, "job scope rejected");
        Ok(())
    }

    fn save_progress(
        &self,
        job: &mut AnalysisJob,
        baseline: Baseline,
        counters: &Counters,
    ) -> Result<(), JobError> {
        job.processed_plots = baseline.processed + counters.processed.load(Ordering::SeqCst);
        job.failed_plots = baseline.failed + counters.failed.load(Ordering::SeqCst);
        job.violations_found = baseline.violations + counters.violations.load(Ordering::SeqCst);
        let mut store = lock(&self.store)?;
        if !self.take_lease(&mut *store, job.id)? {
            tracing::error!(job_id = job.id, "run lease lost to another process");
            return Err(JobError::AlreadyRunning(job.id));
        }
        store.update_job(job)?;
        Ok(())
    }

    /// Take or renew this coordinator's lease on a job.
    fn take_lease(&self, store: &mut dyn ParcelStore, job_id: JobId) -> Result<bool, JobError> {
        let now = Utc::now();
        let ttl = chrono::Duration::from_std(self.lease_ttl)
            .unwrap_or_else(|_| chrono::Duration::seconds(600));
        Ok(store.acquire_lease(job_id, &self.holder, now, now + ttl)?)
    }

    /// Run (or resume) a job to completion, cancellation, or scope failure.
    ///
    /// A scope that cannot be resolved fails the job with kind `scope` before
    /// any provider is called, and is returned as [`JobError::Scope`].
    ///
    /// At most one run per job is active at a time: within a process through
    /// the [`JobTracker`], across processes through a lease in the store.
    /// A second run fails with [`JobError::AlreadyRunning`].
    #[tracing::instrument(skip(self, cancel))]
    pub async fn run(&self, job_id: JobId, cancel: CancelToken) -> Result<RunReport, JobError> {
        let _claim = self.tracker.claim(job_id)?;
        let job = self.status(job_id)?;
        if job.status.is_terminal() {
            return Err(JobError::InvalidTransition {
                id: job_id,
                from: job.status,
                to: JobStatus::Running,
            });
        }
        let leased = {
            let mut store = lock(&self.store)?;
            self.take_lease(&mut *store, job_id)?
        };
        if !leased {
            tracing::warn!(job_id, "job is leased by another run");
            return Err(JobError::AlreadyRunning(job_id));
        }

        let result = self.run_leased(job, cancel).await;
        if let Err(e) =
            lock(&self.store).and_then(|mut store| store.release_lease(job_id, &self.holder))
        {
            tracing::warn!(job_id, error = %e, "failed to release run lease");
        }
        result
    }

    async fn run_leased(
        &self,
        mut job: AnalysisJob,
        cancel: CancelToken,
    ) -> Result<RunReport, JobError> {
        let job_id = job.id;
        let resuming = job.status == JobStatus::Running;

        let (parcels, window) = match self.resolve_scope(&job.scope) {
            Ok(resolved) => resolved,
            Err(JobError::Scope(reason)) => {
                self.fail_scope(&mut job, &reason)?;
                return Err(JobError::Scope(reason));
            }
            Err(e) => return Err(e),
        };

        let in_scope: HashSet<&str> = parcels.iter().map(|p| p.id.as_str()).collect();
        let earlier: Vec<ParcelOutcome> = lock(&self.store)?
            .outcomes_for_job(job_id)?
            .into_iter()
            .filter(|o| in_scope.contains(o.parcel_id.as_str()))
            .collect();
        let done: HashSet<&str> = earlier.iter().map(|o| o.parcel_id.as_str()).collect();
        let pending: Vec<Parcel> = parcels
            .iter()
            .filter(|p| !done.contains(p.id.as_str()))
            .cloned()
            .collect();
        let skipped = count(earlier.len());
        let baseline = Baseline {
            processed: skipped,
            failed: count(earlier.iter().filter(|o| o.kind == OutcomeKind::Failed).count()),
            violations: count(
                earlier
                    .iter()
                    .filter(|o| o.kind == OutcomeKind::Violation)
                    .count(),
            ),
        };

        job.total_plots = count(parcels.len());
        job.processed_plots = baseline.processed;
        job.failed_plots = baseline.failed;
        job.violations_found = baseline.violations;
        {
            let mut store = lock(&self.store)?;
            transition(&mut *store, &mut job, JobStatus::Running)?;
        }
        tracing::info!(
            job_id,
            total = job.total_plots,
            skipped,
            resuming,
            %window,
            "job running"
        );

        let counters = Arc::new(Counters::default());
        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut set: JoinSet<WorkerResult> = JoinSet::new();
        let mut kinds: HashMap<String, &'static str> = HashMap::new();
        let mut dispatched: Vec<String> = Vec::with_capacity(pending.len());
        let mut queue = pending.into_iter();
        let mut next = queue.next();
        let mut cancelled = false;

        while next.is_some() {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    cancelled = true;
                    break;
                }
                Some(joined) = set.join_next(), if !set.is_empty() => {
                    absorb(joined, &mut kinds);
                    self.save_progress(&mut job, baseline, &counters)?;
                }
                permit = Arc::clone(&semaphore).acquire_owned() => {
                    let permit = permit
                        .map_err(|_| StoreError::Internal("worker pool closed".to_string()))?;
                    let Some(parcel) = next.take() else { break };
                    dispatched.push(parcel.id.clone());
                    let worker = ParcelWorker {
                        store: Arc::clone(&self.store),
                        pipeline: Arc::clone(&self.pipeline),
                        counters: Arc::clone(&counters),
                    };
                    set.spawn(async move {
                        let _permit = permit;
                        worker.process(job_id, parcel, window).await
                    });
                    next = queue.next();
                }
            }
        }
        if cancelled {
            tracing::info!(job_id, in_flight = set.len(), "cancellation requested, draining");
        }
        while let Some(joined) = set.join_next().await {
            absorb(joined, &mut kinds);
            self.save_progress(&mut job, baseline, &counters)?;
        }

        let mut outcomes: Vec<ParcelOutcome> = lock(&self.store)?
            .outcomes_for_job(job_id)?
            .into_iter()
            .filter(|o| in_scope.contains(o.parcel_id.as_str()))
            .collect();

        // A worker that died without recording anything still owes an outcome.
        let recorded: HashSet<String> = outcomes.iter().map(|o| o.parcel_id.clone()).collect();
        for parcel_id in dispatched.iter().filter(|id| !recorded.contains(*id)) {
            let outcome = ParcelOutcome {
                parcel_id: parcel_id.clone(),
                kind: OutcomeKind::Failed,
                category: None,
                message: Some("evaluation aborted".to_string()),
            };
            if lock(&self.store)?.record_outcome(job_id, &outcome)? {
                kinds.insert(parcel_id.clone(), "aborted");
                outcomes.push(outcome);
            }
        }

        let report_base = RunReport::from_outcomes(&job, skipped, &outcomes, &kinds);
        job.processed_plots = report_base.processed;
        job.failed_plots = report_base.failed;
        job.violations_found = report_base.violations_found;
        {
            let mut store = lock(&self.store)?;
            if cancelled {
                job.failure_kind = Some(FailureKind::Cancelled);
                job.error_message = Some(format!(
                    "cancelled after {} of {} parcels",
                    job.processed_plots, job.total_plots
                ));
                transition(&mut *store, &mut job, JobStatus::Failed)?;
            } else {
                transition(&mut *store, &mut job, JobStatus::Completed)?;
            }
        }

        let report = RunReport {
            status: job.status,
            failure_kind: job.failure_kind,
            ..report_base
        };
        tracing::info!(
            job_id,
            status = %report.status,
            processed = report.processed,
            succeeded = report.succeeded,
            failed = report.failed,
            violations = report.violations_found,
            "job finished"
        );
        Ok(report)
    }
}

fn absorb(
    joined: Result<WorkerResult, tokio::task::JoinError>,
    kinds: &mut HashMap<String, &'static str>,
) {
    match joined {
        Ok(WorkerResult {
            parcel_id,
            failure_kind: Some(kind),
        }) => {
            kinds.insert(parcel_id, kind);
        }
        Ok(_) => {}
        Err(e) => tracing::error!(error = %e, "parcel worker aborted"),
    }
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
