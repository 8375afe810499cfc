use crate::human_helpers::{format_area, format_job_line, format_scope, format_verdict_human};
use crate::OutputFormatter;
use landwatch_core::types::{AnalysisJob, Parcel, ViolationVerdict};
use landwatch_enforce::types::{EncroachmentCheck, ParcelEvaluation};
use landwatch_enforce::{RunReport, ViolationClassifier};

pub struct HumanFormatter;

impl OutputFormatter for HumanFormatter {
    fn format_evaluation(&self, result: &ParcelEvaluation) -> String {
        let s = &result.snapshot;
        let mut out = format_verdict_human(&result.verdict);
        out.push_str(&format!("\n  window: {}\n", result.window));
        out.push_str(&format!(
            "  built-up: {} ({:.1}%)  heat: {} ({:.1}%)  change: {:.2}\n",
            format_area(s.built_up_area()),
            s.built_up_percentage(),
            format_area(s.heat_signature_area()),
            s.heat_percentage(),
            s.change_score(),
        ));
        if s.has_encroachment() {
            out.push_str(&format!(
                "  encroachment: {} ({:.1}% of approved)\n",
                format_area(s.encroachment_area()),
                s.encroachment_ratio() * 100.0,
            ));
        }
        out
    }

    fn format_encroachment(&self, result: &EncroachmentCheck) -> String {
        let mut out = format!(
            "{}: approved {}, detected {}, {:.1}% of detected inside approval\n",
            result.parcel_id,
            format_area(result.approved_area_m2),
            format_area(result.detected_area_m2),
            result.overlap_percentage,
        );
        if result.encroachment.detected {
            out.push_str(&format!(
                "  encroaching: {} ({:.1}% of approved)\n",
                format_area(result.encroachment.area_m2),
                result.ratio() * 100.0,
            ));
        } else {
            out.push_str("  no encroachment\n");
        }
        out
    }

    fn format_run(&self, report: &RunReport) -> String {
        let status = match report.failure_kind {
            Some(kind) => format!("{} ({})", report.status, kind),
            None => report.status.to_string(),
        };
        let mut out = format!(
            "Job #{} {}: {}/{} parcels, {} succeeded, {} failed, {} violation(s)\n",
            report.job_id,
            status,
            report.processed,
            report.total,
            report.succeeded,
            report.failed,
            report.violations_found,
        );
        if report.skipped > 0 {
            out.push_str(&format!(
                "  resumed: {} parcel(s) carried over from an earlier run\n",
                report.skipped
            ));
        }
        for (category, n) in &report.by_category {
            out.push_str(&format!("  {}: {}\n", category, n));
        }
        if !report.failures.is_empty() {
            out.push_str(&format!("\nFailures ({}):\n", report.failures.len()));
            for f in &report.failures {
                out.push_str(&format!("  {} [{}] {}\n", f.parcel_id, f.kind, f.message));
            }
        }
        out
    }

    fn format_job(&self, job: &AnalysisJob) -> String {
        let mut out = format_job_line(job);
        out.push('\n');
        out.push_str(&format!("  scope: {}\n", format_scope(&job.scope)));
        if let Some(by) = &job.created_by {
            out.push_str(&format!("  created by: {}\n", by));
        }
        if let Some(started) = job.started_at {
            out.push_str(&format!("  started: {}\n", started.to_rfc3339()));
        }
        if let Some(completed) = job.completed_at {
            out.push_str(&format!("  completed: {}\n", completed.to_rfc3339()));
        }
        if let Some(message) = &job.error_message {
            match job.failure_kind {
                Some(kind) => out.push_str(&format!("  error ({}): {}\n", kind, message)),
                None => out.push_str(&format!("  error: {}\n", message)),
            }
        }
        out
    }

    fn format_jobs(&self, jobs: &[AnalysisJob]) -> String {
        if jobs.is_empty() {
            return "No jobs.\n".to_string();
        }
        let mut out = String::new();
        for job in jobs {
            out.push_str(&format_job_line(job));
            out.push('\n');
        }
        out
    }

    fn format_verdicts(&self, verdicts: &[ViolationVerdict]) -> String {
        if verdicts.is_empty() {
            return "No violations recorded.\n".to_string();
        }
        let mut out = String::new();
        for v in verdicts {
            out.push_str(&format_verdict_human(v));
            out.push('\n');
        }
        let summary: Vec<String> = ViolationClassifier::summarize(verdicts)
            .into_iter()
            .map(|(category, n)| format!("{} {}", n, category))
            .collect();
        out.push_str(&format!("{} verdict(s): {}\n", verdicts.len(), summary.join(", ")));
        out
    }

    fn format_parcels(&self, parcels: &[Parcel]) -> String {
        if parcels.is_empty() {
            return "No parcels registered.\n".to_string();
        }
        let mut out = String::new();
        for p in parcels {
            out.push_str(&format!(
                "{:<12} {:<14} {:>12}  {:<8}",
                p.id,
                p.land_use.as_str(),
                format_area(p.approved_area),
                if p.active { "active" } else { "inactive" },
            ));
            if let Some(name) = &p.industry_name {
                out.push_str(&format!("  {}", name));
            }
            out.push('\n');
        }
        out
    }
}
