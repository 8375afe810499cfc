use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use landwatch_core::store::ParcelStore;
use landwatch_core::types::DateWindow;
use landwatch_enforce::coordinator::DEFAULT_LOOKBACK_DAYS;
use landwatch_enforce::pipeline::Pipeline;
use landwatch_enforce::provider_file::FileProvider;
use landwatch_enforce::retry::RetryPolicy;
use landwatch_enforce::types::ParcelEvaluation;
use landwatch_output::OutputFormatter;

use super::workspace::{runtime, Workspace};

/// Run `landwatch classify <parcel_id>` -- evaluate one registered parcel
/// from its observation file. Nothing is recorded. Exits 1 on a violation.
pub fn run(
    formatter: &dyn OutputFormatter,
    parcel_id: &str,
    observations: &str,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> i32 {
    let ws = match Workspace::open("classify") {
        Ok(ws) => ws,
        Err(code) => return code,
    };
    let store = match ws.store("classify") {
        Ok(s) => s,
        Err(code) => return code,
    };
    let parcel = match store.find_parcel(parcel_id) {
        Ok(Some(p)) => p,
        Ok(None) => {
            eprintln!("landwatch classify: no parcel '{}'", parcel_id);
            return 2;
        }
        Err(e) => {
            eprintln!("landwatch classify: {}", e);
            return 2;
        }
    };

    let window = match (from, to) {
        (Some(start), Some(end)) => DateWindow::new(start, end),
        _ => DateWindow::trailing(Utc::now().date_naive(), DEFAULT_LOOKBACK_DAYS),
    };
    if !window.is_ordered() {
        eprintln!("landwatch classify: window {} ends before it starts", window);
        return 2;
    }

    let provider = Arc::new(FileProvider::new(observations));
    let pipeline = Pipeline::new(
        provider.clone(),
        provider,
        ws.config.thresholds,
        RetryPolicy::from_config(&ws.config.batch),
    );
    let rt = match runtime("classify") {
        Ok(rt) => rt,
        Err(code) => return code,
    };

    match rt.block_on(pipeline.evaluate(&parcel, &window)) {
        Ok((snapshot, verdict)) => {
            let violation = verdict.is_violation();
            let result = ParcelEvaluation {
                window,
                snapshot,
                verdict,
            };
            print!("{}", formatter.format_evaluation(&result));
            if violation {
                1
            } else {
                0
            }
        }
        Err(e) => {
            eprintln!("landwatch classify: {} evaluation failed ({}): {}", parcel_id, e.kind(), e);
            2
        }
    }
}
