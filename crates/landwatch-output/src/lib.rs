//! Output formatters for landwatch command results.
//!
//! Provides two output modes:
//! - **Human** (default): aligned plain text for terminal users
//! - **JSON** (`--json`): machine-readable structured output

pub mod human;
pub(crate) mod human_helpers;
pub mod json;

use landwatch_core::types::{AnalysisJob, Parcel, ViolationVerdict};
use landwatch_enforce::types::{EncroachmentCheck, ParcelEvaluation};
use landwatch_enforce::RunReport;

pub trait OutputFormatter {
    fn format_evaluation(&self, result: &ParcelEvaluation) -> String;
    fn format_encroachment(&self, result: &EncroachmentCheck) -> String;
    fn format_run(&self, report: &RunReport) -> String;
    fn format_job(&self, job: &AnalysisJob) -> String;
    fn format_jobs(&self, jobs: &[AnalysisJob]) -> String;
    fn format_verdicts(&self, verdicts: &[ViolationVerdict]) -> String;
    fn format_parcels(&self, parcels: &[Parcel]) -> String;
}
