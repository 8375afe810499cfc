//! `landwatch config` command -- get or set configuration values.
//!
//! Supports dot-notation for nested keys:
//!   landwatch config                                        # dump full config as JSON
//!   landwatch config batch.workers                          # get one value
//!   landwatch config thresholds.change_detection_threshold 0.8

use std::fs;
use std::path::Path;

use landwatch_core::config::LandwatchConfig;

use super::workspace::DIR;

pub fn run(key: Option<String>, value: Option<String>) -> i32 {
    let cwd = match std::env::current_dir() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("landwatch config: failed to get current directory: {}", e);
            return 2;
        }
    };

    let dir = cwd.join(DIR);
    if !dir.exists() {
        eprintln!("landwatch config: not initialized. Run `landwatch init` first.");
        return 2;
    }

    // Read the file alone so env overrides are never written back.
    let config = match LandwatchConfig::load_file(&dir) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("landwatch config: {}", e);
            return 2;
        }
    };

    match (key, value) {
        (None, None) => dump_config(&config),
        (Some(k), None) => get_config(&config, &k),
        (Some(k), Some(v)) => set_config(&dir, &config, &k, &v),
        (None, Some(_)) => {
            eprintln!("landwatch config: value provided without key");
            2
        }
    }
}

fn dump_config(config: &LandwatchConfig) -> i32 {
    match serde_json::to_string_pretty(config) {
        Ok(json) => {
            println!("{}", json);
            0
        }
        Err(e) => {
            eprintln!("landwatch config: failed to serialize: {}", e);
            2
        }
    }
}

fn get_config(config: &LandwatchConfig, key: &str) -> i32 {
    let json_value = match serde_json::to_value(config) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("landwatch config: failed to serialize: {}", e);
            return 2;
        }
    };

    match resolve_dot_path(&json_value, key) {
        Some(v) => {
            let output = match v {
                serde_json::Value::String(s) => s.to_string(),
                other => other.to_string(),
            };
            println!("{}", output);
            0
        }
        None => {
            eprintln!("landwatch config: unknown key '{}'", key);
            1
        }
    }
}

fn set_config(dir: &Path, config: &LandwatchConfig, key: &str, value: &str) -> i32 {
    let updated = match updated_config(config, key, value) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("landwatch config: {}", msg);
            return 1;
        }
    };

    let json = match serde_json::to_string_pretty(&updated) {
        Ok(json) => json,
        Err(e) => {
            eprintln!("landwatch config: failed to serialize: {}", e);
            return 2;
        }
    };
    match fs::write(dir.join("landwatch.json"), json) {
        Ok(_) => {
            eprintln!("landwatch config: {} = {}", key, value);
            0
        }
        Err(e) => {
            eprintln!("landwatch config: failed to write config: {}", e);
            2
        }
    }
}

/// Apply `key = value` and re-validate the whole config.
fn updated_config(config: &LandwatchConfig, key: &str, value: &str) -> Result<LandwatchConfig, String> {
    let mut json_value =
        serde_json::to_value(config).map_err(|e| format!("failed to serialize: {}", e))?;
    if !set_dot_path(&mut json_value, key, parse_value(value)) {
        return Err(format!("unknown key '{}'", key));
    }
    let updated: LandwatchConfig = serde_json::from_value(json_value)
        .map_err(|e| format!("invalid value for '{}': {}", key, e))?;
    updated
        .validate()
        .map_err(|e| format!("invalid value for '{}': {}", key, e))?;
    Ok(updated)
}

fn parse_value(value: &str) -> serde_json::Value {
    match value {
        "true" => serde_json::Value::Bool(true),
        "false" => serde_json::Value::Bool(false),
        "null" => serde_json::Value::Null,
        _ => {
            if let Ok(n) = value.parse::<i64>() {
                serde_json::Value::Number(n.into())
            } else if let Ok(f) = value.parse::<f64>() {
                serde_json::Number::from_f64(f)
                    .map(serde_json::Value::Number)
                    .unwrap_or_else(|| serde_json::Value::String(value.to_string()))
            } else {
                serde_json::Value::String(value.to_string())
            }
        }
    }
}

fn resolve_dot_path<'a>(value: &'a serde_json::Value, path: &str) -> Option<&'a serde_json::Value> {
    let mut current = value;
    for segment in path.split('.') {
        current = current.get(segment)?;
    }
    Some(current)
}

fn set_dot_path(value: &mut serde_json::Value, path: &str, new_value: serde_json::Value) -> bool {
    let segments: Vec<&str> = path.split('.').collect();
    let Some((last, parents)) = segments.split_last() else {
        return false;
    };

    let mut current = value;
    for segment in parents {
        current = match current.get_mut(*segment) {
            Some(v) => v,
            None => return false,
        };
    }

    if current.get(*last).is_some() {
        current[*last] = new_value;
        true
    } else {
        false
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
