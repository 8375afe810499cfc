use crate::OutputFormatter;
use landwatch_core::types::{AnalysisJob, Parcel, ViolationVerdict};
use landwatch_enforce::types::{EncroachmentCheck, ParcelEvaluation};
use landwatch_enforce::{RunReport, ViolationClassifier};

pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn format_evaluation(&self, result: &ParcelEvaluation) -> String {
        serde_json::to_string_pretty(result).unwrap_or_default()
    }
    fn format_encroachment(&self, result: &EncroachmentCheck) -> String {
        serde_json::to_string_pretty(result).unwrap_or_default()
    }
    fn format_run(&self, report: &RunReport) -> String {
        serde_json::to_string_pretty(report).unwrap_or_default()
    }
    fn format_job(&self, job: &AnalysisJob) -> String {
        serde_json::to_string_pretty(job).unwrap_or_default()
    }
    fn format_jobs(&self, jobs: &[AnalysisJob]) -> String {
        serde_json::to_string_pretty(jobs).unwrap_or_default()
    }
    fn format_verdicts(&self, verdicts: &[ViolationVerdict]) -> String {
        let value = serde_json::json!({
            "verdicts": verdicts,
            "summary": ViolationClassifier::summarize(verdicts),
        });
        serde_json::to_string_pretty(&value).unwrap_or_default()
    }
    fn format_parcels(&self, parcels: &[Parcel]) -> String {
        serde_json::to_string_pretty(parcels).unwrap_or_default()
    }
}
