//! Job lifecycle: `PENDING → RUNNING → {COMPLETED, FAILED}`.
//!
//! Transitions are validated against [`JobStatus::can_transition_to`] and
//! persisted immediately. A [`JobTracker`] hands out at most one
//! [`RunClaim`] per job id within one process. Runs in separate processes are
//! kept apart by the store's job lease, which the coordinator takes before
//! the first transition and renews while the run makes progress.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use landwatch_core::store::ParcelStore;
use landwatch_core::types::{AnalysisJob, JobId, JobStatus, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("job {0} not found")]
    NotFound(JobId),

    #[error("invalid job scope: {0}")]
    Scope(String),

    #[error("job {id} cannot move from {from} to {to}")]
    InvalidTransition {
        id: JobId,
        from: JobStatus,
        to: JobStatus,
    },

    #[error("job {0} is already running")]
    AlreadyRunning(JobId),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Tracks which jobs currently have an active run in this process.
#[derive(Debug, Clone, Default)]
pub struct JobTracker {
    active: Arc<Mutex<HashSet<JobId>>>,
}

impl JobTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim exclusive run rights for a job until the claim is dropped.
    pub fn claim(&self, id: JobId) -> Result<RunClaim, JobError> {
        let mut active = self
            .active
            .lock()
            .map_err(|_| StoreError::Internal("job tracker lock poisoned".to_string()))?;
        if !active.insert(id) {
            return Err(JobError::AlreadyRunning(id));
        }
        Ok(RunClaim {
            id,
            active: Arc::clone(&self.active),
        })
    }

    pub fn is_running(&self, id: JobId) -> bool {
        self.active
            .lock()
            .map(|active| active.contains(&id))
            .unwrap_or(false)
    }
}

/// Exclusive right to drive one job's transitions.
#[derive(Debug)]
pub struct RunClaim {
    id: JobId,
    active: Arc<Mutex<HashSet<JobId>>>,
}

impl RunClaim {
    pub fn job_id(&self) -> JobId {
        self.id
    }
}

impl Drop for RunClaim {
    fn drop(&mut self) {
        if let Ok(mut active) = self.active.lock() {
            active.remove(&self.id);
        }
    }
}

/// Move a job to `next`, stamp timestamps, and persist it.
pub fn transition(
    store: &mut dyn ParcelStore,
    job: &mut AnalysisJob,
    next: JobStatus,
) -> Result<(), JobError> {
    let from = job.status;
    if !from.can_transition_to(next) {
        return Err(JobError::InvalidTransition {
            id: job.id,
            from,
            to: next,
        });
    }
    job.status = next;
    let now = Utc::now();
    match next {
        JobStatus::Running if job.started_at.is_none() => job.started_at = Some(now),
        JobStatus::Completed | JobStatus::Failed => job.completed_at = Some(now),
        _ => {}
    }
    store.update_job(job)?;
    tracing::info!(job_id = job.id, %from, to = %next, "job transition");
    Ok(())
}
