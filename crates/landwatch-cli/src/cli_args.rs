use chrono::NaiveDate;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "landwatch",
    version,
    about = "Land-use violation detection for regulated industrial parcels"
)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as structured JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Report progress details on stderr
    #[arg(long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Create .landwatch/ with a default config and an empty database
    Init,

    /// Register, list, or retire parcels
    #[command(subcommand)]
    Parcel(ParcelCommand),

    /// Evaluate one parcel and print its verdict without recording it
    Classify {
        /// Parcel id
        parcel_id: String,
        /// Directory of <parcel_id>.json observation files
        #[arg(long, env = "LANDWATCH_OBSERVATIONS")]
        observations: String,
        /// Imagery window start (YYYY-MM-DD)
        #[arg(long, requires = "to")]
        from: Option<NaiveDate>,
        /// Imagery window end (YYYY-MM-DD)
        #[arg(long, requires = "from")]
        to: Option<NaiveDate>,
    },

    /// Compare a detected footprint with an approved boundary (GeoJSON files)
    Encroach {
        /// Approved boundary
        approved: String,
        /// Detected activity footprint
        detected: String,
        /// Label for the result
        #[arg(long, default_value = "-")]
        parcel_id: String,
    },

    /// Submit and run a batch analysis job
    Run {
        /// Comma-separated parcel ids
        #[arg(long, value_delimiter = ',', conflicts_with_all = ["from", "job"])]
        parcels: Vec<String>,
        /// Date-range job over every active parcel: window start (YYYY-MM-DD)
        #[arg(long, requires = "to", conflicts_with = "job")]
        from: Option<NaiveDate>,
        /// Date-range window end (YYYY-MM-DD)
        #[arg(long, requires = "from")]
        to: Option<NaiveDate>,
        /// Resume an interrupted job instead of submitting a new one
        #[arg(long)]
        job: Option<i64>,
        /// Directory of <parcel_id>.json observation files
        #[arg(long, env = "LANDWATCH_OBSERVATIONS")]
        observations: String,
        /// Override batch.workers
        #[arg(long)]
        workers: Option<usize>,
        /// Recorded as the job's creator
        #[arg(long, env = "USER")]
        created_by: Option<String>,
    },

    /// Inspect analysis jobs
    #[command(subcommand)]
    Job(JobCommand),

    /// List recorded violation verdicts
    Verdicts {
        /// Verdicts produced by one job
        #[arg(long, conflicts_with = "parcel")]
        job: Option<i64>,
        /// Verdict history of one parcel
        #[arg(long)]
        parcel: Option<String>,
    },

    /// Get or set configuration values
    Config {
        /// Config key (dot-notation, e.g. thresholds.change_detection_threshold)
        key: Option<String>,
        /// Value to set
        value: Option<String>,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell type (bash, zsh, fish, elvish, powershell)
        shell: String,
    },
}

#[derive(Subcommand, Debug)]
pub(crate) enum ParcelCommand {
    /// Register parcels from a JSON file (one parcel or an array)
    Add {
        /// Path to the parcel JSON
        file: String,
    },
    /// List parcels
    List {
        /// Include inactive parcels
        #[arg(long)]
        all: bool,
    },
    /// Mark a parcel inactive
    Deactivate {
        /// Parcel id
        id: String,
    },
}

#[derive(Subcommand, Debug)]
pub(crate) enum JobCommand {
    /// Show one job's status and progress
    Status {
        /// Job id
        id: i64,
    },
    /// List recent jobs, newest first
    List {
        /// Maximum number of jobs
        #[arg(long, default_value = "20")]
        limit: usize,
    },
}

#[cfg(test)]
#[path = "cli_args_tests.rs"]
mod tests;
