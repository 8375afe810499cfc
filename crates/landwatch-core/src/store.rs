use chrono::{DateTime, Utc};

use crate::snapshot::DetectionSnapshot;
use crate::types::{AnalysisJob, JobId, Parcel, ParcelOutcome, StoreError, ViolationVerdict};

/// Narrow persistence contract used by the batch coordinator and the CLI.
///
/// Geometry never flows through the store for computation; it is only
/// persisted and handed back. Per-parcel writes for a job are idempotent on
/// (job, parcel) so an interrupted job can be re-run safely.
pub trait ParcelStore {
    /// Insert or replace a parcel.
    fn save_parcel(&mut self, parcel: &Parcel) -> Result<(), StoreError>;

    /// Look up a parcel by id, active or not.
    fn find_parcel(&self, id: &str) -> Result<Option<Parcel>, StoreError>;

    /// List parcels ordered by id.
    fn list_parcels(&self, active_only: bool) -> Result<Vec<Parcel>, StoreError>;

    /// Logically remove a parcel. Returns false if it did not exist.
    fn deactivate_parcel(&mut self, id: &str) -> Result<bool, StoreError>;

    /// Persist a new job and return its assigned id.
    fn create_job(&mut self, job: &AnalysisJob) -> Result<JobId, StoreError>;

    fn find_job(&self, id: JobId) -> Result<Option<AnalysisJob>, StoreError>;

    /// Overwrite the mutable fields of an existing job.
    fn update_job(&mut self, job: &AnalysisJob) -> Result<(), StoreError>;

    /// Most recent jobs first.
    fn list_jobs(&self, limit: usize) -> Result<Vec<AnalysisJob>, StoreError>;

    /// Take or renew the run lease on a job until `expires_at`.
    ///
    /// Returns false while a different holder's lease is unexpired at `now`.
    /// Leases live in the database, so they exclude holders in other
    /// processes too.
    fn acquire_lease(
        &mut self,
        job_id: JobId,
        holder: &str,
        now: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Result<bool, StoreError>;

    /// Drop a lease, if `holder` still owns it.
    fn release_lease(&mut self, job_id: JobId, holder: &str) -> Result<(), StoreError>;

    /// Record that a parcel was processed for a job.
    /// Returns false when an outcome was already recorded (nothing written).
    fn record_outcome(&mut self, job_id: JobId, outcome: &ParcelOutcome) -> Result<bool, StoreError>;

    fn outcomes_for_job(&self, job_id: JobId) -> Result<Vec<ParcelOutcome>, StoreError>;

    /// Keep the detection record for a snapshot evaluated under a job.
    fn save_snapshot(&mut self, job_id: JobId, snapshot: &DetectionSnapshot) -> Result<(), StoreError>;

    /// Persist a verdict. Returns false when one already exists for (job, parcel).
    fn save_verdict(&mut self, job_id: JobId, verdict: &ViolationVerdict) -> Result<bool, StoreError>;

    fn verdicts_for_parcel(&self, parcel_id: &str) -> Result<Vec<ViolationVerdict>, StoreError>;

    fn verdicts_for_job(&self, job_id: JobId) -> Result<Vec<ViolationVerdict>, StoreError>;
}
