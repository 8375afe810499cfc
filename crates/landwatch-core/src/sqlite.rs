use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::snapshot::DetectionSnapshot;
use crate::store::ParcelStore;
use crate::types::{
    AnalysisJob, JobId, Parcel, ParcelOutcome, StoreError, ViolationVerdict,
};

const SCHEMA_VERSION: u32 = 1;

/// SQLite-backed implementation of the ParcelStore trait.
pub struct SqliteParcelStore {
    pub(crate) conn: Connection,
}

impl SqliteParcelStore {
    /// Open or create a landwatch database at the given path.
    pub fn open(path: &str) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        Self::set_performance_pragmas(&conn)?;
        let store = SqliteParcelStore { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Create an in-memory database (for testing).
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::set_performance_pragmas(&conn)?;
        let store = SqliteParcelStore { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    fn set_performance_pragmas(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA cache_size = -8000;
            PRAGMA temp_store = MEMORY;
            PRAGMA foreign_keys = ON;
            ",
        )?;
        Ok(())
    }

    fn initialize_schema(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS landwatch_meta (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS parcels (
                id TEXT PRIMARY KEY,
                boundary TEXT NOT NULL,
                approved_area REAL NOT NULL CHECK (approved_area > 0),
                land_use TEXT NOT NULL,
                active INTEGER NOT NULL DEFAULT 1,
                industry_name TEXT,
                owner_name TEXT,
                created_at TEXT NOT NULL DEFAULT (datetime('now')),
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            );
            CREATE INDEX IF NOT EXISTS idx_parcels_active ON parcels(active);
            CREATE INDEX IF NOT EXISTS idx_parcels_land_use ON parcels(land_use);

            CREATE TABLE IF NOT EXISTS analysis_jobs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                scope TEXT NOT NULL,
                status TEXT NOT NULL
                    CHECK (status IN ('PENDING', 'RUNNING', 'COMPLETED', 'FAILED')),
                total_plots INTEGER NOT NULL DEFAULT 0,
                processed_plots INTEGER NOT NULL DEFAULT 0,
                violations_found INTEGER NOT NULL DEFAULT 0,
                failed_plots INTEGER NOT NULL DEFAULT 0,
                started_at TEXT,
                completed_at TEXT,
                error_message TEXT,
                failure_kind TEXT,
                created_by TEXT,
                created_at TEXT NOT NULL DEFAULT (datetime('now')),
                CHECK (processed_plots <= total_plots)
            );

            CREATE TABLE IF NOT EXISTS job_leases (
                job_id INTEGER PRIMARY KEY REFERENCES analysis_jobs(id) ON DELETE CASCADE,
                holder TEXT NOT NULL,
                expires_at INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS parcel_outcomes (
                job_id INTEGER NOT NULL REFERENCES analysis_jobs(id) ON DELETE CASCADE,
                parcel_id TEXT NOT NULL,
                outcome TEXT NOT NULL CHECK (outcome IN ('compliant', 'violation', 'failed')),
                category TEXT,
                message TEXT,
                recorded_at TEXT NOT NULL DEFAULT (datetime('now')),
                PRIMARY KEY (job_id, parcel_id)
            );

            CREATE TABLE IF NOT EXISTS detections (
                id INTEGER PRIMARY KEY,
                job_id INTEGER NOT NULL REFERENCES analysis_jobs(id) ON DELETE CASCADE,
                parcel_id TEXT NOT NULL REFERENCES parcels(id),
                fingerprint TEXT NOT NULL,
                payload TEXT NOT NULL,
                created_at TEXT NOT NULL DEFAULT (datetime('now')),
                UNIQUE (job_id, parcel_id)
            );
            CREATE INDEX IF NOT EXISTS idx_detections_parcel ON detections(parcel_id);

            CREATE TABLE IF NOT EXISTS verdicts (
                id INTEGER PRIMARY KEY,
                job_id INTEGER NOT NULL REFERENCES analysis_jobs(id) ON DELETE CASCADE,
                parcel_id TEXT NOT NULL REFERENCES parcels(id),
                category TEXT NOT NULL,
                severity TEXT NOT NULL CHECK (severity IN ('LOW', 'MEDIUM', 'HIGH', 'CRITICAL')),
                confidence REAL NOT NULL CHECK (confidence >= 0 AND confidence <= 1),
                priority INTEGER NOT NULL CHECK (priority BETWEEN 1 AND 5),
                description TEXT NOT NULL,
                actions TEXT NOT NULL DEFAULT '[]',
                evidence TEXT,
                snapshot_fingerprint TEXT NOT NULL,
                resolved INTEGER NOT NULL DEFAULT 0,
                field_verified INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL DEFAULT (datetime('now')),
                UNIQUE (job_id, parcel_id)
            );
            CREATE INDEX IF NOT EXISTS idx_verdicts_parcel ON verdicts(parcel_id);
            CREATE INDEX IF NOT EXISTS idx_verdicts_category_severity ON verdicts(category, severity);
            ",
        )?;

        self.conn.execute(
            "INSERT OR IGNORE INTO landwatch_meta (key, value) VALUES ('schema_version', ?1)",
            params![SCHEMA_VERSION.to_string()],
        )?;

        self.check_schema_version()?;
        Ok(())
    }

    /// Refuse databases whose schema this build does not know.
    fn check_schema_version(&self) -> Result<(), StoreError> {
        let stored = self.schema_version()?;
        if stored != SCHEMA_VERSION {
            return Err(StoreError::SchemaMigration {
                from: stored,
                to: SCHEMA_VERSION,
            });
        }
        Ok(())
    }

    /// Get the current schema version.
    pub fn schema_version(&self) -> Result<u32, StoreError> {
        let version: String = self.conn.query_row(
            "SELECT value FROM landwatch_meta WHERE key = 'schema_version'",
            [],
            |row| row.get(0),
        )?;
        version
            .parse()
            .map_err(|e| StoreError::Internal(format!("Invalid schema version: {}", e)))
    }
}

impl ParcelStore for SqliteParcelStore {
    fn save_parcel(&mut self, parcel: &Parcel) -> Result<(), StoreError> {
        let boundary = serde_json::to_string(&parcel.boundary)?;
        self.conn.execute(
            "INSERT INTO parcels (id, boundary, approved_area, land_use, active, industry_name, owner_name)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(id) DO UPDATE SET
                boundary = excluded.boundary,
                approved_area = excluded.approved_area,
                land_use = excluded.land_use,
                active = excluded.active,
                industry_name = excluded.industry_name,
                owner_name = excluded.owner_name,
                updated_at = datetime('now')",
            params![
                parcel.id,
                boundary,
                parcel.approved_area,
                parcel.land_use.as_str(),
                parcel.active as i32,
                parcel.industry_name,
                parcel.owner_name,
            ],
        )?;
        Ok(())
    }

    fn find_parcel(&self, id: &str) -> Result<Option<Parcel>, StoreError> {
        let row = self
            .conn
            .query_row(
                "SELECT id, boundary, approved_area, land_use, active, industry_name, owner_name
                 FROM parcels WHERE id = ?1",
                params![id],
                Self::row_to_parcel_raw,
            )
            .optional()?;
        row.map(Self::parcel_from_raw).transpose()
    }

    fn list_parcels(&self, active_only: bool) -> Result<Vec<Parcel>, StoreError> {
        let sql = if active_only {
            "SELECT id, boundary, approved_area, land_use, active, industry_name, owner_name
             FROM parcels WHERE active = 1 ORDER BY id"
        } else {
            "SELECT id, boundary, approved_area, land_use, active, industry_name, owner_name
             FROM parcels ORDER BY id"
        };
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map([], Self::row_to_parcel_raw)?;
        let mut parcels = Vec::new();
        for raw in rows {
            parcels.push(Self::parcel_from_raw(raw?)?);
        }
        Ok(parcels)
    }

    fn deactivate_parcel(&mut self, id: &str) -> Result<bool, StoreError> {
        let changed = self.conn.execute(
            "UPDATE parcels SET active = 0, updated_at = datetime('now') WHERE id = ?1",
            params![id],
        )?;
        Ok(changed > 0)
    }

    fn create_job(&mut self, job: &AnalysisJob) -> Result<JobId, StoreError> {
        self.insert_job(job)
    }

    fn find_job(&self, id: JobId) -> Result<Option<AnalysisJob>, StoreError> {
        self.query_job(id)
    }

    fn update_job(&mut self, job: &AnalysisJob) -> Result<(), StoreError> {
        self.write_job(job)
    }

    fn list_jobs(&self, limit: usize) -> Result<Vec<AnalysisJob>, StoreError> {
        self.query_jobs(limit)
    }

    fn acquire_lease(
        &mut self,
        job_id: JobId,
        holder: &str,
        now: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let changed = self.conn.execute(
            "INSERT INTO job_leases (job_id, holder, expires_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(job_id) DO UPDATE SET
                holder = excluded.holder,
                expires_at = excluded.expires_at
             WHERE job_leases.holder = excluded.holder OR job_leases.expires_at <= ?4",
            params![
                job_id,
                holder,
                expires_at.timestamp_millis(),
                now.timestamp_millis()
            ],
        )?;
        Ok(changed > 0)
    }

    fn release_lease(&mut self, job_id: JobId, holder: &str) -> Result<(), StoreError> {
        self.conn.execute(
            "DELETE FROM job_leases WHERE job_id = ?1 AND holder = ?2",
            params![job_id, holder],
        )?;
        Ok(())
    }

    fn record_outcome(&mut self, job_id: JobId, outcome: &ParcelOutcome) -> Result<bool, StoreError> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO parcel_outcomes (job_id, parcel_id, outcome, category, message)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                job_id,
                outcome.parcel_id,
                outcome.kind.as_str(),
                outcome.category.map(|c| c.as_str()),
                outcome.message,
            ],
        )?;
        Ok(inserted > 0)
    }

    fn outcomes_for_job(&self, job_id: JobId) -> Result<Vec<ParcelOutcome>, StoreError> {
        self.query_outcomes(job_id)
    }

    fn save_snapshot(&mut self, job_id: JobId, snapshot: &DetectionSnapshot) -> Result<(), StoreError> {
        let payload = serde_json::to_string(snapshot)?;
        self.conn.execute(
            "INSERT OR IGNORE INTO detections (job_id, parcel_id, fingerprint, payload)
             VALUES (?1, ?2, ?3, ?4)",
            params![job_id, snapshot.parcel_id(), snapshot.fingerprint(), payload],
        )?;
        Ok(())
    }

    fn save_verdict(&mut self, job_id: JobId, verdict: &ViolationVerdict) -> Result<bool, StoreError> {
        self.insert_verdict(job_id, verdict)
    }

    fn verdicts_for_parcel(&self, parcel_id: &str) -> Result<Vec<ViolationVerdict>, StoreError> {
        self.query_verdicts("parcel_id = ?1", params![parcel_id])
    }

    fn verdicts_for_job(&self, job_id: JobId) -> Result<Vec<ViolationVerdict>, StoreError> {
        self.query_verdicts("job_id = ?1", params![job_id])
    }
}

#[cfg(test)]
#[path = "sqlite_tests.rs"]
mod tests;
