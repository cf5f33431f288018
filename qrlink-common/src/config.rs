//! Configuration loading and key lookup
//!
//! Two concerns live here:
//! - [`get_value`]: flat key lookup against a TOML key-value file, read fresh on
//!   every call. Never fails; every cause of a missing value is logged.
//! - [`TomlConfig`]: bootstrap settings for the binary, resolved in priority
//!   order command-line argument → environment variable → `./config.toml`.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// Default config file name, relative to the working directory
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Environment variable naming an alternative config file
pub const CONFIG_ENV_VAR: &str = "QRLINK_CONFIG";

/// Look up `key` in the key-value file `source_name`
///
/// Keys may be written either as dotted paths (`db.url = "..."` or a `[db]`
/// table with `url = "..."`) or as a single quoted key (`"db.url" = "..."`).
/// Scalar values are returned as text; tables and arrays are treated as
/// missing.
///
/// Returns `None` when the source name or key is blank, the file is missing,
/// unreadable or not valid TOML, or the key is not present.
pub fn get_value(source_name: &str, key: &str) -> Option<String> {
    if source_name.trim().is_empty() {
        error!("Config source name cannot be empty");
        return None;
    }
    if key.trim().is_empty() {
        error!("Config key cannot be empty");
        return None;
    }

    let path = Path::new(source_name);
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            error!(source = source_name, "Config file not found");
            return None;
        }
        Err(e) => {
            error!(source = source_name, error = %e, "Error reading config file");
            return None;
        }
    };

    let table: toml::Table = match toml::from_str(&content) {
        Ok(table) => table,
        Err(e) => {
            error!(source = source_name, error = %e, "Error parsing config file");
            return None;
        }
    };

    let value = lookup(&table, key);
    if value.is_none() {
        warn!(key, source = source_name, "Config key not found");
    }
    value
}

fn lookup(table: &toml::Table, key: &str) -> Option<String> {
    if let Some(value) = table.get(key) {
        return scalar_to_string(value);
    }

    let mut segments = key.split('.');
    let mut current = table.get(segments.next()?)?;
    for segment in segments {
        current = current.as_table()?.get(segment)?;
    }
    scalar_to_string(current)
}

fn scalar_to_string(value: &toml::Value) -> Option<String> {
    match value {
        toml::Value::String(s) => Some(s.clone()),
        toml::Value::Integer(i) => Some(i.to_string()),
        toml::Value::Float(f) => Some(f.to_string()),
        toml::Value::Boolean(b) => Some(b.to_string()),
        toml::Value::Datetime(d) => Some(d.to_string()),
        toml::Value::Array(_) | toml::Value::Table(_) => None,
    }
}

// ============================================================================
// Bootstrap configuration
// ============================================================================

/// Bootstrap configuration loaded from the TOML file
///
/// Every section is optional; absent values fall back to compiled defaults
/// chosen by the binary. Unknown keys (including the `db` section, which is
/// read through [`get_value`]) are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Remote summary API settings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiConfig {
    /// API key sent in the `x-goog-api-key` header
    #[serde(default)]
    pub key: Option<String>,

    /// Override for the generateContent endpoint
    #[serde(default)]
    pub endpoint: Option<String>,
}

/// QR image output settings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Resolve the config file path
///
/// Priority:
/// 1. Command-line argument (highest priority)
/// 2. `QRLINK_CONFIG` environment variable
/// 3. `./config.toml`
pub fn resolve_config_path(cli_arg: Option<&Path>) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    PathBuf::from(DEFAULT_CONFIG_FILE)
}

/// Read and parse a bootstrap config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))
}

/// Load the bootstrap config, degrading to defaults when it is missing or broken
pub fn load_or_default(path: &Path) -> TomlConfig {
    config_or_default(path, load_toml_config(path))
}

/// Report the outcome of an earlier [`load_toml_config`] and fall back to defaults
///
/// Lets the binary parse once before logging is up and report afterwards.
pub fn config_or_default(path: &Path, loaded: Result<TomlConfig>) -> TomlConfig {
    match loaded {
        Ok(config) => {
            info!("Loaded configuration from {}", path.display());
            config
        }
        Err(Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!(
                "Config file {} not found, using built-in defaults",
                path.display()
            );
            TomlConfig::default()
        }
        Err(e) => {
            warn!("{}; using built-in defaults", e);
            TomlConfig::default()
        }
    }
}
