use std::fs;

use landwatch_core::config::LandwatchConfig;
use landwatch_core::sqlite::SqliteParcelStore;

use super::workspace::{DB_FILE, DIR};

/// Run `landwatch init` -- create .landwatch/, write the default config and
/// an empty database.
pub fn run(verbose: bool) -> i32 {
    let cwd = match std::env::current_dir() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("landwatch init: failed to get current directory: {}", e);
            return 2;
        }
    };

    let dir = cwd.join(DIR);
    if dir.exists() {
        eprintln!("landwatch init: {}/ directory already exists", DIR);
        return 2;
    }
    if let Err(e) = fs::create_dir_all(&dir) {
        eprintln!("landwatch init: failed to create {}: {}", dir.display(), e);
        return 2;
    }

    let config = LandwatchConfig::default();
    let json = match serde_json::to_string_pretty(&config) {
        Ok(json) => json,
        Err(e) => {
            eprintln!("landwatch init: failed to serialize config: {}", e);
            return 2;
        }
    };
    if let Err(e) = fs::write(dir.join("landwatch.json"), json) {
        eprintln!("landwatch init: failed to write config: {}", e);
        return 2;
    }

    let db_path = dir.join(DB_FILE);
    if let Err(e) = SqliteParcelStore::open(db_path.to_str().unwrap_or("")) {
        eprintln!("landwatch init: failed to create database: {}", e);
        return 2;
    }

    if verbose {
        eprintln!("landwatch init: initialized in {}", dir.display());
    }
    0
}
