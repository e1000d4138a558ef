//! Config loader — reads `~/.agentnx/config.json`, migrates legacy model
//! references, and applies env var overrides.
//!
//! # Loading precedence
//! 1. Defaults (from `Config::default()`)
//! 2. JSON file at `~/.agentnx/config.json`
//! 3. Environment variables `AGENTNX_…` (override JSON)

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::schema::{Config, ProviderEntry};
use crate::error::{Error, Result};
use crate::types::ModelReference;

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    crate::utils::get_data_path().join("config.json")
}

/// Load configuration from the given path (or the default one) + env vars.
///
/// Falls back to `Config::default()` if the file doesn't exist or can't be parsed.
pub fn load_config(path: Option<&Path>) -> Config {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);
    apply_env_overrides(load_config_from_path(&config_path))
}

/// Load config from a specific file path, without env overrides.
fn load_config_from_path(path: &Path) -> Config {
    match load_config_strict(path) {
        Ok(config) => config,
        Err(e) => {
            warn!("{}, using defaults", e);
            Config::default()
        }
    }
}

/// Load the file at `path` as written, without env overrides or fallback.
///
/// A missing file yields `Config::default()`. An unreadable or invalid file
/// is an error, so a caller that saves the result never overwrites a file it
/// could not parse.
pub fn load_config_strict(path: &Path) -> Result<Config> {
    if !path.exists() {
        info!("No config file found at {}, using defaults", path.display());
        return Ok(Config::default());
    }

    debug!("Loading config from {}", path.display());

    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::configuration(format!("failed to read config file {}: {e}", path.display()))
    })?;

    let mut raw: serde_json::Value = serde_json::from_str(&content).map_err(|e| {
        Error::configuration(format!("failed to parse config JSON {}: {e}", path.display()))
    })?;

    migrate_config(&mut raw);

    serde_json::from_value(raw).map_err(|e| {
        Error::configuration(format!("failed to deserialize config {}: {e}", path.display()))
    })
}

/// Save configuration to disk (pretty-printed JSON with camelCase keys).
pub fn save_config(config: &Config, path: Option<&Path>) -> std::io::Result<()> {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(config)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

    std::fs::write(&config_path, json)?;
    debug!("Config saved to {}", config_path.display());
    Ok(())
}

/// Rewrite legacy string-encoded `modelA` / `modelB` values into objects.
///
/// Older settings stored `"{\"provider\":\"x\",\"modelId\":\"y\"}"` as a
/// string; `"x/y"` is accepted too. Anything else is dropped.
fn migrate_config(raw: &mut serde_json::Value) {
    let Some(obj) = raw.as_object_mut() else {
        return;
    };

    for key in ["modelA", "modelB"] {
        let encoded = match obj.get(key) {
            Some(serde_json::Value::String(s)) => s.clone(),
            _ => continue,
        };

        let migrated = serde_json::from_str::<ModelReference>(&encoded)
            .ok()
            .or_else(|| encoded.parse::<ModelReference>().ok());

        match migrated {
            Some(reference) => {
                debug!(key, model = %reference, "Migrated string-encoded model reference");
                obj.insert(
                    key.to_string(),
                    serde_json::to_value(reference).unwrap_or(serde_json::Value::Null),
                );
            }
            None => {
                warn!(key, value = %encoded, "Dropping unreadable model reference");
                obj.insert(key.to_string(), serde_json::Value::Null);
            }
        }
    }
}

/// Apply environment variable overrides on top of a loaded config.
///
/// Supported overrides:
/// - `AGENTNX_MODEL_A` / `AGENTNX_MODEL_B` → `provider/modelId`
/// - `AGENTNX_PROMPT_A` / `AGENTNX_PROMPT_B`
/// - `AGENTNX_PROVIDERS__<NAME>__URL` → `providers.<name>.url`
/// - `AGENTNX_PROVIDERS__<NAME>__API_KEY` → `providers.<name>.apiKey`
/// - `AGENTNX_HTTP__TIMEOUT_SECS` → `http.timeoutSecs`
pub fn apply_env_overrides(config: Config) -> Config {
    apply_overrides(config, std::env::vars())
}

fn apply_overrides(mut config: Config, vars: impl Iterator<Item = (String, String)>) -> Config {
    for (key, val) in vars {
        match key.as_str() {
            "AGENTNX_MODEL_A" => match val.parse() {
                Ok(r) => config.pipeline.model_a = Some(r),
                Err(e) => warn!("Ignoring AGENTNX_MODEL_A: {}", e),
            },
            "AGENTNX_MODEL_B" => match val.parse() {
                Ok(r) => config.pipeline.model_b = Some(r),
                Err(e) => warn!("Ignoring AGENTNX_MODEL_B: {}", e),
            },
            "AGENTNX_PROMPT_A" => config.pipeline.prompt_a = val,
            "AGENTNX_PROMPT_B" => config.pipeline.prompt_b = val,
            "AGENTNX_HTTP__TIMEOUT_SECS" => {
                if let Ok(n) = val.parse::<u64>() {
                    config.http.timeout_secs = n;
                }
            }
            _ => apply_provider_env(&mut config, &key, val),
        }
    }
    config
}

/// Handle `AGENTNX_PROVIDERS__<NAME>__URL` and `…__API_KEY`.
fn apply_provider_env(config: &mut Config, key: &str, val: String) {
    let Some(rest) = key.strip_prefix("AGENTNX_PROVIDERS__") else {
        return;
    };
    let Some((name, field)) = rest.rsplit_once("__") else {
        return;
    };
    if name.is_empty() {
        return;
    }

    let name = name.to_lowercase();
    match field {
        "URL" => {
            config
                .providers
                .entry(name)
                .or_insert_with(ProviderEntry::default)
                .url = val
        }
        "API_KEY" => {
            config
                .providers
                .entry(name)
                .or_insert_with(ProviderEntry::default)
                .api_key = val
        }
        _ => {}
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
