//! Configuration file loading for landwatch.
//!
//! Reads `.landwatch/landwatch.json` and provides typed access to all settings.
//! Falls back to defaults when the file is missing or incomplete, then applies
//! `LANDWATCH_*` environment overrides. Unlike a missing file, an unreadable
//! file, a bad override, or a threshold out of range is a hard error: the
//! process must not start with a configuration it cannot trust.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Errors raised while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("failed to parse {path}: {reason}")]
    Parse { path: String, reason: String },

    #[error("invalid value for {key}: {value:?}")]
    Override { key: String, value: String },

    #[error("{name} out of range: {value} (expected {expected})")]
    OutOfRange {
        name: &'static str,
        value: f64,
        expected: &'static str,
    },
}

/// Top-level landwatch configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandwatchConfig {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub thresholds: Thresholds,
    #[serde(default)]
    pub batch: BatchConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Classifier tunables.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Tolerated encroachment as a fraction of the approved area.
    #[serde(default = "default_encroachment_threshold")]
    pub encroachment_threshold: f64,
    /// Built-up / approved ratio above which construction is illegal.
    #[serde(default = "default_construction_threshold")]
    pub illegal_construction_threshold: f64,
    /// Heat-signature fraction under which land counts as unused.
    #[serde(default = "default_unused_threshold")]
    pub unused_land_threshold: f64,
    /// Change probability at or above which a change is suspicious.
    #[serde(default = "default_change_threshold")]
    pub change_detection_threshold: f64,
}

/// Upper bound on concurrent parcel evaluations per run.
pub const MAX_WORKERS: usize = 1024;

/// Batch coordinator tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    #[serde(default = "default_workers")]
    pub workers: usize,
    #[serde(default = "default_provider_timeout_ms")]
    pub provider_timeout_ms: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

fn default_version() -> String {
    "0.1.0".to_string()
}
fn default_encroachment_threshold() -> f64 {
    0.01
}
fn default_construction_threshold() -> f64 {
    1.10
}
fn default_unused_threshold() -> f64 {
    0.05
}
fn default_change_threshold() -> f64 {
    0.70
}
fn default_workers() -> usize {
    4
}
fn default_provider_timeout_ms() -> u64 {
    30_000
}
fn default_max_retries() -> u32 {
    3
}
fn default_retry_backoff_ms() -> u64 {
    200
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            encroachment_threshold: default_encroachment_threshold(),
            illegal_construction_threshold: default_construction_threshold(),
            unused_land_threshold: default_unused_threshold(),
            change_detection_threshold: default_change_threshold(),
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            provider_timeout_ms: default_provider_timeout_ms(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Default for LandwatchConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            thresholds: Thresholds::default(),
            batch: BatchConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Thresholds {
    /// Check every threshold against its valid numeric range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        unit_interval("encroachment_threshold", self.encroachment_threshold)?;
        unit_interval("unused_land_threshold", self.unused_land_threshold)?;
        unit_interval("change_detection_threshold", self.change_detection_threshold)?;
        let c = self.illegal_construction_threshold;
        if !c.is_finite() || c < 1.0 {
            return Err(ConfigError::OutOfRange {
                name: "illegal_construction_threshold",
                value: c,
                expected: "a finite ratio >= 1.0",
            });
        }
        Ok(())
    }
}

fn unit_interval(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::OutOfRange {
            name,
            value,
            expected: "a value in [0, 1]",
        });
    }
    Ok(())
}

impl LandwatchConfig {
    /// Load configuration from `landwatch.json` inside the given directory,
    /// apply environment overrides and validate.
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        let mut cfg = Self::load_file(config_dir)?;
        cfg.apply_overrides(|key| std::env::var(key).ok())?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read the config file alone. A missing file yields defaults.
    pub fn load_file(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("landwatch.json");
        let content = match std::fs::read_to_string(&config_path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(ConfigError::Read {
                    path: config_path.display().to_string(),
                    reason: e.to_string(),
                })
            }
        };
        serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
            path: config_path.display().to_string(),
            reason: e.to_string(),
        })
    }

    /// Apply `LANDWATCH_*` overrides supplied by `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let t = &mut self.thresholds;
        override_value(&lookup, "LANDWATCH_ENCROACHMENT_THRESHOLD", &mut t.encroachment_threshold)?;
        override_value(
            &lookup,
            "LANDWATCH_ILLEGAL_CONSTRUCTION_THRESHOLD",
            &mut t.illegal_construction_threshold,
        )?;
        override_value(&lookup, "LANDWATCH_UNUSED_LAND_THRESHOLD", &mut t.unused_land_threshold)?;
        override_value(
            &lookup,
            "LANDWATCH_CHANGE_DETECTION_THRESHOLD",
            &mut t.change_detection_threshold,
        )?;
        let b = &mut self.batch;
        override_value(&lookup, "LANDWATCH_WORKERS", &mut b.workers)?;
        override_value(&lookup, "LANDWATCH_PROVIDER_TIMEOUT_MS", &mut b.provider_timeout_ms)?;
        override_value(&lookup, "LANDWATCH_MAX_RETRIES", &mut b.max_retries)?;
        if let Some(level) = lookup("LANDWATCH_LOG") {
            self.logging.level = level;
        }
        Ok(())
    }

    /// Validate thresholds and batch limits.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.thresholds.validate()?;
        if !(1..=MAX_WORKERS).contains(&self.batch.workers) {
            return Err(ConfigError::OutOfRange {
                name: "batch.workers",
                value: self.batch.workers as f64,
                expected: "between 1 and 1024",
            });
        }
        if self.batch.provider_timeout_ms == 0 {
            return Err(ConfigError::OutOfRange {
                name: "batch.provider_timeout_ms",
                value: 0.0,
                expected: "at least 1 ms",
            });
        }
        Ok(())
    }
}

fn override_value<F, T>(lookup: &F, key: &str, slot: &mut T) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    if let Some(raw) = lookup(key) {
        *slot = raw.trim().parse().map_err(|_| ConfigError::Override {
            key: key.to_string(),
            value: raw.clone(),
        })?;
    }
    Ok(())
}
