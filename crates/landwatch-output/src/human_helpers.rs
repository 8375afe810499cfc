use landwatch_core::types::{AnalysisJob, JobScope, ViolationVerdict};

/// Areas below one hectare in square meters, larger ones in hectares.
pub(crate) fn format_area(m2: f64) -> String {
    if m2.abs() >= 10_000.0 {
        format!("{:.2} ha", m2 / 10_000.0)
    } else {
        format!("{:.0} m²", m2)
    }
}

pub(crate) fn format_scope(scope: &JobScope) -> String {
    match scope {
        JobScope::Parcels { ids } if ids.len() <= 5 => format!("parcels {}", ids.join(", ")),
        JobScope::Parcels { ids } => format!(
            "parcels {}, ... ({} total)",
            ids[..3].join(", "),
            ids.len()
        ),
        JobScope::DateRange { window } => format!("active parcels, imagery {}", window),
    }
}

pub(crate) fn format_verdict_human(v: &ViolationVerdict) -> String {
    let mut out = format!(
        "{}[{}]: {}\n   = severity: {}  priority: {}  confidence: {:.0}%\n",
        if v.is_violation() { "violation" } else { "ok" },
        v.category,
        v.parcel_id,
        v.severity,
        v.priority,
        v.confidence * 100.0,
    );
    out.push_str(&format!("   = {}\n", v.description));
    if v.evidence.is_some() {
        out.push_str("   = evidence: encroaching region attached\n");
    }
    for (i, action) in v.actions.iter().enumerate() {
        out.push_str(&format!("   {}. {}\n", i + 1, action));
    }
    out
}

pub(crate) fn format_job_line(job: &AnalysisJob) -> String {
    format!(
        "#{:<5} {:<9} {:>4}/{:<4} {:>3.0}%  violations {:<4} failed {}",
        job.id,
        job.status.as_str(),
        job.processed_plots,
        job.total_plots,
        job.progress() * 100.0,
        job.violations_found,
        job.failed_plots,
    )
}
