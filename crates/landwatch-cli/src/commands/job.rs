use landwatch_core::store::ParcelStore;
use landwatch_core::types::JobStatus;
use landwatch_output::OutputFormatter;

use super::workspace::Workspace;
use crate::cli_args::JobCommand;

/// Run `landwatch job status|list`. `status` exits 1 for a FAILED job.
pub fn run(formatter: &dyn OutputFormatter, command: JobCommand) -> i32 {
    let ws = match Workspace::open("job") {
        Ok(ws) => ws,
        Err(code) => return code,
    };
    let store = match ws.store("job") {
        Ok(s) => s,
        Err(code) => return code,
    };

    match command {
        JobCommand::Status { id } => match store.find_job(id) {
            Ok(Some(job)) => {
                print!("{}", formatter.format_job(&job));
                if job.status == JobStatus::Failed {
                    1
                } else {
                    0
                }
            }
            Ok(None) => {
                eprintln!("landwatch job: no job #{}", id);
                2
            }
            Err(e) => {
                eprintln!("landwatch job: {}", e);
                2
            }
        },
        JobCommand::List { limit } => match store.list_jobs(limit) {
            Ok(jobs) => {
                print!("{}", formatter.format_jobs(&jobs));
                0
            }
            Err(e) => {
                eprintln!("landwatch job: {}", e);
                2
            }
        },
    }
}
