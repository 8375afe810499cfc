use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// The single coordinate reference used by every geometry in the system.
pub const CRS: &str = "EPSG:4326";

/// A longitude/latitude pair in degrees.
pub type Position = [f64; 2];

/// GeoJSON-shaped geometry as it crosses provider, store, and output boundaries.
///
/// Rings are stored exactly as received (closing vertex included) so the
/// geometry engine can reject unclosed or degenerate rings instead of
/// silently repairing them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum GeoShape {
    Polygon(Vec<Vec<Position>>),
    MultiPolygon(Vec<Vec<Vec<Position>>>),
}

impl GeoShape {
    /// Convenience constructor for a polygon without holes.
    pub fn polygon(exterior: Vec<Position>) -> Self {
        GeoShape::Polygon(vec![exterior])
    }

    pub fn kind(&self) -> &'static str {
        match self {
            GeoShape::Polygon(_) => "Polygon",
            GeoShape::MultiPolygon(_) => "MultiPolygon",
        }
    }

    /// Total number of vertices across every ring.
    pub fn vertex_count(&self) -> usize {
        match self {
            GeoShape::Polygon(rings) => rings.iter().map(Vec::len).sum(),
            GeoShape::MultiPolygon(polys) => polys
                .iter()
                .flat_map(|rings| rings.iter().map(Vec::len))
                .sum(),
        }
    }
}

/// Approved land-use category of a parcel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LandUse {
    Industrial,
    Commercial,
    MixedUse,
    Warehouse,
    Manufacturing,
    Logistics,
}

impl LandUse {
    pub fn as_str(&self) -> &'static str {
        match self {
            LandUse::Industrial => "industrial",
            LandUse::Commercial => "commercial",
            LandUse::MixedUse => "mixed_use",
            LandUse::Warehouse => "warehouse",
            LandUse::Manufacturing => "manufacturing",
            LandUse::Logistics => "logistics",
        }
    }
}

impl std::fmt::Display for LandUse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LandUse {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "industrial" => Ok(LandUse::Industrial),
            "commercial" => Ok(LandUse::Commercial),
            "mixed_use" => Ok(LandUse::MixedUse),
            "warehouse" => Ok(LandUse::Warehouse),
            "manufacturing" => Ok(LandUse::Manufacturing),
            "logistics" => Ok(LandUse::Logistics),
            other => Err(format!("unknown land use: {other}")),
        }
    }
}

/// A regulated industrial parcel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parcel {
    pub id: String,
    pub boundary: GeoShape,
    /// Approved area in square meters.
    pub approved_area: f64,
    pub land_use: LandUse,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub industry_name: Option<String>,
    #[serde(default)]
    pub owner_name: Option<String>,
}

fn default_true() -> bool {
    true
}

/// Inclusive date range used both as a job scope and as the imagery window
/// handed to providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn is_ordered(&self) -> bool {
        self.start <= self.end
    }

    /// The trailing window of `days` ending on `end`.
    pub fn trailing(end: NaiveDate, days: u32) -> Self {
        let start = end - chrono::Duration::days(i64::from(days));
        Self { start, end }
    }
}

impl std::fmt::Display for DateWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Scalar outputs of the external inference models for one parcel.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceMetrics {
    pub built_up_area: f64,
    pub built_up_percentage: f64,
    pub heat_signature_area: f64,
    pub heat_percentage: f64,
    pub change_score: f64,
    pub mean_ndvi: f64,
    pub mean_ndbi: f64,
}

/// Violation category assigned by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationCategory {
    Encroachment,
    IllegalConstruction,
    SuspiciousChange,
    UnusedLand,
    Compliant,
}

impl ViolationCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationCategory::Encroachment => "encroachment",
            ViolationCategory::IllegalConstruction => "illegal_construction",
            ViolationCategory::SuspiciousChange => "suspicious_change",
            ViolationCategory::UnusedLand => "unused_land",
            ViolationCategory::Compliant => "compliant",
        }
    }

    pub fn is_violation(&self) -> bool {
        !matches!(self, ViolationCategory::Compliant)
    }
}

impl std::fmt::Display for ViolationCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViolationCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "encroachment" => Ok(ViolationCategory::Encroachment),
            "illegal_construction" => Ok(ViolationCategory::IllegalConstruction),
            "suspicious_change" => Ok(ViolationCategory::SuspiciousChange),
            "unused_land" => Ok(ViolationCategory::UnusedLand),
            "compliant" => Ok(ViolationCategory::Compliant),
            other => Err(format!("unknown violation category: {other}")),
        }
    }
}

/// Severity of a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
            Severity::Critical => "CRITICAL",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LOW" => Ok(Severity::Low),
            "MEDIUM" => Ok(Severity::Medium),
            "HIGH" => Ok(Severity::High),
            "CRITICAL" => Ok(Severity::Critical),
            other => Err(format!("unknown severity: {other}")),
        }
    }
}

/// The classifier's decision for one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViolationVerdict {
    pub parcel_id: String,
    pub category: ViolationCategory,
    pub severity: Severity,
    /// Always within [0, 1].
    pub confidence: f64,
    /// 1 (urgent) through 5.
    pub priority: u8,
    pub description: String,
    /// Ordered remediation steps; order is significant for display.
    pub actions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence: Option<GeoShape>,
    /// Fingerprint of the snapshot this verdict was derived from.
    pub snapshot_fingerprint: String,
}

impl ViolationVerdict {
    pub fn is_violation(&self) -> bool {
        self.category.is_violation()
    }
}

pub type JobId = i64;

/// Lifecycle of an analysis job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "PENDING",
            JobStatus::Running => "RUNNING",
            JobStatus::Completed => "COMPLETED",
            JobStatus::Failed => "FAILED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    /// Whether moving from `self` to `next` is a legal transition.
    ///
    /// RUNNING -> RUNNING is allowed so an interrupted job can resume.
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (JobStatus::Pending, JobStatus::Running)
                | (JobStatus::Pending, JobStatus::Failed)
                | (JobStatus::Running, JobStatus::Running)
                | (JobStatus::Running, JobStatus::Completed)
                | (JobStatus::Running, JobStatus::Failed)
        )
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(JobStatus::Pending),
            "RUNNING" => Ok(JobStatus::Running),
            "COMPLETED" => Ok(JobStatus::Completed),
            "FAILED" => Ok(JobStatus::Failed),
            other => Err(format!("unknown job status: {other}")),
        }
    }
}

/// Why a job ended in FAILED.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Scope,
    Cancelled,
    Error,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Scope => "scope",
            FailureKind::Cancelled => "cancelled",
            FailureKind::Error => "error",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FailureKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scope" => Ok(FailureKind::Scope),
            "cancelled" => Ok(FailureKind::Cancelled),
            "error" => Ok(FailureKind::Error),
            other => Err(format!("unknown failure kind: {other}")),
        }
    }
}

/// Which parcels a job covers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JobScope {
    Parcels { ids: Vec<String> },
    DateRange { window: DateWindow },
}

/// A tracked batch run of the evaluation pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisJob {
    pub id: JobId,
    pub scope: JobScope,
    pub status: JobStatus,
    pub total_plots: u32,
    pub processed_plots: u32,
    pub violations_found: u32,
    pub failed_plots: u32,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
    pub failure_kind: Option<FailureKind>,
    pub created_by: Option<String>,
}

impl AnalysisJob {
    /// A fresh PENDING job. The id is assigned by the store.
    pub fn pending(scope: JobScope, created_by: Option<String>) -> Self {
        Self {
            id: 0,
            scope,
            status: JobStatus::Pending,
            total_plots: 0,
            processed_plots: 0,
            violations_found: 0,
            failed_plots: 0,
            started_at: None,
            completed_at: None,
            error_message: None,
            failure_kind: None,
            created_by,
        }
    }

    /// Fraction of the scope processed so far, in [0, 1].
    pub fn progress(&self) -> f64 {
        if self.total_plots == 0 {
            return 0.0;
        }
        f64::from(self.processed_plots) / f64::from(self.total_plots)
    }
}

/// How a single parcel ended within a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Compliant,
    Violation,
    Failed,
}

impl OutcomeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeKind::Compliant => "compliant",
            OutcomeKind::Violation => "violation",
            OutcomeKind::Failed => "failed",
        }
    }
}

impl FromStr for OutcomeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "compliant" => Ok(OutcomeKind::Compliant),
            "violation" => Ok(OutcomeKind::Violation),
            "failed" => Ok(OutcomeKind::Failed),
            other => Err(format!("unknown outcome: {other}")),
        }
    }
}

/// Durable record that a parcel was processed for a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParcelOutcome {
    pub parcel_id: String,
    pub kind: OutcomeKind,
    pub category: Option<ViolationCategory>,
    pub message: Option<String>,
}

/// Errors that can occur during store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Schema migration required: v{from} -> v{to}")]
    SchemaMigration { from: u32, to: u32 },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Database(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}
