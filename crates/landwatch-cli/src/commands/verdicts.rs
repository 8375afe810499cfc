use landwatch_core::store::ParcelStore;
use landwatch_output::OutputFormatter;

use super::workspace::Workspace;

/// Run `landwatch verdicts` -- recorded violations for a job or a parcel.
/// Without a filter, shows the most recent job's verdicts.
pub fn run(formatter: &dyn OutputFormatter, job: Option<i64>, parcel: Option<String>) -> i32 {
    let ws = match Workspace::open("verdicts") {
        Ok(ws) => ws,
        Err(code) => return code,
    };
    let store = match ws.store("verdicts") {
        Ok(s) => s,
        Err(code) => return code,
    };

    let verdicts = match (job, parcel) {
        (_, Some(parcel_id)) => store.verdicts_for_parcel(&parcel_id),
        (Some(job_id), None) => store.verdicts_for_job(job_id),
        (None, None) => match store.list_jobs(1) {
            Ok(jobs) => match jobs.first() {
                Some(latest) => store.verdicts_for_job(latest.id),
                None => Ok(Vec::new()),
            },
            Err(e) => Err(e),
        },
    };

    match verdicts {
        Ok(verdicts) => {
            print!("{}", formatter.format_verdicts(&verdicts));
            0
        }
        Err(e) => {
            eprintln!("landwatch verdicts: {}", e);
            2
        }
    }
}
