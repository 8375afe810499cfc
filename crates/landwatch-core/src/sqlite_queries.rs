use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Result as SqlResult};

use crate::sqlite::SqliteParcelStore;
use crate::types::{
    AnalysisJob, FailureKind, JobId, JobScope, JobStatus, OutcomeKind, Parcel, ParcelOutcome,
    StoreError, ViolationCategory, ViolationVerdict,
};

/// Parcel columns as read from SQLite, before JSON/enum decoding.
pub(crate) struct ParcelRow {
    id: String,
    boundary: String,
    approved_area: f64,
    land_use: String,
    active: bool,
    industry_name: Option<String>,
    owner_name: Option<String>,
}

/// Job columns as read from SQLite, before JSON/enum decoding.
pub(crate) struct JobRow {
    id: JobId,
    scope: String,
    status: String,
    total_plots: u32,
    processed_plots: u32,
    violations_found: u32,
    failed_plots: u32,
    started_at: Option<String>,
    completed_at: Option<String>,
    error_message: Option<String>,
    failure_kind: Option<String>,
    created_by: Option<String>,
}

const JOB_COLUMNS: &str = "id, scope, status, total_plots, processed_plots, violations_found, \
     failed_plots, started_at, completed_at, error_message, failure_kind, created_by";

const VERDICT_COLUMNS: &str = "parcel_id, category, severity, confidence, priority, description, \
     actions, evidence, snapshot_fingerprint";

fn decode<T: std::str::FromStr<Err = String>>(raw: &str) -> Result<T, StoreError> {
    raw.parse().map_err(StoreError::Internal)
}

fn parse_time(raw: Option<String>) -> Result<Option<DateTime<Utc>>, StoreError> {
    raw.map(|s| {
        DateTime::parse_from_rfc3339(&s)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|e| StoreError::Internal(format!("bad timestamp {s:?}: {e}")))
    })
    .transpose()
}

impl SqliteParcelStore {
    pub(crate) fn row_to_parcel_raw(row: &rusqlite::Row) -> SqlResult<ParcelRow> {
        Ok(ParcelRow {
            id: row.get(0)?,
            boundary: row.get(1)?,
            approved_area: row.get(2)?,
            land_use: row.get(3)?,
            active: row.get::<_, i32>(4)? != 0,
            industry_name: row.get(5)?,
            owner_name: row.get(6)?,
        })
    }

    pub(crate) fn parcel_from_raw(raw: ParcelRow) -> Result<Parcel, StoreError> {
        Ok(Parcel {
            id: raw.id,
            boundary: serde_json::from_str(&raw.boundary)?,
            approved_area: raw.approved_area,
            land_use: decode(&raw.land_use)?,
            active: raw.active,
            industry_name: raw.industry_name,
            owner_name: raw.owner_name,
        })
    }

    fn row_to_job_raw(row: &rusqlite::Row) -> SqlResult<JobRow> {
        Ok(JobRow {
            id: row.get(0)?,
            scope: row.get(1)?,
            status: row.get(2)?,
            total_plots: row.get(3)?,
            processed_plots: row.get(4)?,
            violations_found: row.get(5)?,
            failed_plots: row.get(6)?,
            started_at: row.get(7)?,
            completed_at: row.get(8)?,
            error_message: row.get(9)?,
            failure_kind: row.get(10)?,
            created_by: row.get(11)?,
        })
    }

    fn job_from_raw(raw: JobRow) -> Result<AnalysisJob, StoreError> {
        let scope: JobScope = serde_json::from_str(&raw.scope)?;
        let status: JobStatus = decode(&raw.status)?;
        let failure_kind = match raw.failure_kind.as_deref() {
            Some(k) => Some(decode::<FailureKind>(k)?),
            None => None,
        };
        Ok(AnalysisJob {
            id: raw.id,
            scope,
            status,
            total_plots: raw.total_plots,
            processed_plots: raw.processed_plots,
            violations_found: raw.violations_found,
            failed_plots: raw.failed_plots,
            started_at: parse_time(raw.started_at)?,
            completed_at: parse_time(raw.completed_at)?,
            error_message: raw.error_message,
            failure_kind,
            created_by: raw.created_by,
        })
    }

    pub(crate) fn insert_job(&mut self, job: &AnalysisJob) -> Result<JobId, StoreError> {
        let scope = serde_json::to_string(&job.scope)?;
        self.conn.execute(
            "INSERT INTO analysis_jobs (scope, status, total_plots, processed_plots,
                violations_found, failed_plots, started_at, completed_at, error_message,
                failure_kind, created_by)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                scope,
                job.status.as_str(),
                job.total_plots,
                job.processed_plots,
                job.violations_found,
                job.failed_plots,
                job.started_at.map(|t| t.to_rfc3339()),
                job.completed_at.map(|t| t.to_rfc3339()),
                job.error_message,
                job.failure_kind.map(|k| k.as_str()),
                job.created_by,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub(crate) fn write_job(&mut self, job: &AnalysisJob) -> Result<(), StoreError> {
        let changed = self.conn.execute(
            "UPDATE analysis_jobs SET status = ?2, total_plots = ?3, processed_plots = ?4,
                violations_found = ?5, failed_plots = ?6, started_at = ?7, completed_at = ?8,
                error_message = ?9, failure_kind = ?10
             WHERE id = ?1",
            params![
                job.id,
                job.status.as_str(),
                job.total_plots,
                job.processed_plots,
                job.violations_found,
                job.failed_plots,
                job.started_at.map(|t| t.to_rfc3339()),
                job.completed_at.map(|t| t.to_rfc3339()),
                job.error_message,
                job.failure_kind.map(|k| k.as_str()),
            ],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(format!("job {}", job.id)));
        }
        Ok(())
    }

    pub(crate) fn query_job(&self, id: JobId) -> Result<Option<AnalysisJob>, StoreError> {
        let sql = format!("SELECT {JOB_COLUMNS} FROM analysis_jobs WHERE id = ?1");
        let raw = self
            .conn
            .query_row(&sql, params![id], Self::row_to_job_raw)
            .optional()?;
        raw.map(Self::job_from_raw).transpose()
    }

    pub(crate) fn query_jobs(&self, limit: usize) -> Result<Vec<AnalysisJob>, StoreError> {
        let sql = format!("SELECT {JOB_COLUMNS} FROM analysis_jobs ORDER BY id DESC LIMIT ?1");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![limit as i64], Self::row_to_job_raw)?;
        let mut jobs = Vec::new();
        for raw in rows {
            jobs.push(Self::job_from_raw(raw?)?);
        }
        Ok(jobs)
    }

    pub(crate) fn query_outcomes(&self, job_id: JobId) -> Result<Vec<ParcelOutcome>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT parcel_id, outcome, category, message FROM parcel_outcomes
             WHERE job_id = ?1 ORDER BY parcel_id",
        )?;
        let rows = stmt.query_map(params![job_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, Option<String>>(3)?,
            ))
        })?;
        let mut outcomes = Vec::new();
        for row in rows {
            let (parcel_id, kind, category, message) = row?;
            outcomes.push(ParcelOutcome {
                parcel_id,
                kind: decode::<OutcomeKind>(&kind)?,
                category: category.as_deref().map(decode::<ViolationCategory>).transpose()?,
                message,
            });
        }
        Ok(outcomes)
    }

    pub(crate) fn insert_verdict(
        &mut self,
        job_id: JobId,
        verdict: &ViolationVerdict,
    ) -> Result<bool, StoreError> {
        let actions = serde_json::to_string(&verdict.actions)?;
        let evidence = verdict
            .evidence
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO verdicts (job_id, parcel_id, category, severity, confidence,
                priority, description, actions, evidence, snapshot_fingerprint)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                job_id,
                verdict.parcel_id,
                verdict.category.as_str(),
                verdict.severity.as_str(),
                verdict.confidence,
                verdict.priority,
                verdict.description,
                actions,
                evidence,
                verdict.snapshot_fingerprint,
            ],
        )?;
        Ok(inserted > 0)
    }

    pub(crate) fn query_verdicts<P: rusqlite::Params>(
        &self,
        filter: &str,
        params: P,
    ) -> Result<Vec<ViolationVerdict>, StoreError> {
        let sql = format!("SELECT {VERDICT_COLUMNS} FROM verdicts WHERE {filter} ORDER BY id");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params, |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, f64>(3)?,
                row.get::<_, u8>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, String>(6)?,
                row.get::<_, Option<String>>(7)?,
                row.get::<_, String>(8)?,
            ))
        })?;
        let mut verdicts = Vec::new();
        for row in rows {
            let (parcel_id, category, severity, confidence, priority, description, actions, evidence, fp) =
                row?;
            verdicts.push(ViolationVerdict {
                parcel_id,
                category: decode(&category)?,
                severity: decode(&severity)?,
                confidence,
                priority,
                description,
                actions: serde_json::from_str(&actions)?,
                evidence: evidence.as_deref().map(serde_json::from_str).transpose()?,
                snapshot_fingerprint: fp,
            });
        }
        Ok(verdicts)
    }
}
