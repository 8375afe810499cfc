//! Locating and opening the `.landwatch/` directory shared by every command.

use std::path::PathBuf;

use landwatch_core::config::LandwatchConfig;
use landwatch_core::sqlite::SqliteParcelStore;

pub(crate) const DIR: &str = ".landwatch";
pub(crate) const DB_FILE: &str = "landwatch.db";

/// An initialized `.landwatch/` directory with its loaded config.
pub(crate) struct Workspace {
    pub dir: PathBuf,
    pub config: LandwatchConfig,
}

impl Workspace {
    /// Find `.landwatch/` under the current directory and load its config.
    /// Errors are reported on stderr; the `Err` carries the exit code.
    pub fn open(cmd: &str) -> Result<Self, i32> {
        let cwd = std::env::current_dir().map_err(|e| {
            eprintln!("landwatch {}: failed to get current directory: {}", cmd, e);
            2
        })?;
        let dir = cwd.join(DIR);
        if !dir.exists() {
            eprintln!("landwatch {}: not initialized. Run `landwatch init` first.", cmd);
            return Err(2);
        }
        let config = LandwatchConfig::load(&dir).map_err(|e| {
            eprintln!("landwatch {}: {}", cmd, e);
            2
        })?;
        Ok(Self { dir, config })
    }

    pub fn store(&self, cmd: &str) -> Result<SqliteParcelStore, i32> {
        let db_path = self.dir.join(DB_FILE);
        SqliteParcelStore::open(db_path.to_str().unwrap_or("")).map_err(|e| {
            eprintln!("landwatch {}: failed to open database: {}", cmd, e);
            2
        })
    }
}

/// Logging settings from the workspace config when one exists, defaults
/// otherwise. `--verbose` raises the level to debug.
pub(crate) fn init_logging(verbose: bool) {
    let mut logging = std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(DIR))
        .filter(|dir| dir.exists())
        .and_then(|dir| LandwatchConfig::load_file(&dir).ok())
        .unwrap_or_default()
        .logging;
    if verbose {
        logging.level = "debug".to_string();
    }
    landwatch_core::logging::init(&logging);
}

/// Multi-threaded runtime for commands that drive async providers.
pub(crate) fn runtime(cmd: &str) -> Result<tokio::runtime::Runtime, i32> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| {
            eprintln!("landwatch {}: failed to start async runtime: {}", cmd, e);
            2
        })
}
