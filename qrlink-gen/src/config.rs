//! Runtime settings for qrlink-gen
//!
//! Combines the bootstrap TOML file with environment overrides and compiled
//! defaults into the [`PipelineSettings`] the orchestrator runs with.

use crate::http::REQUEST_TIMEOUT;
use crate::summary::DEFAULT_ENDPOINT;
use qrlink_common::config::TomlConfig;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Environment variable holding the summary API key
pub const API_KEY_ENV_VAR: &str = "QRLINK_API_KEY";

/// Default QR image path, relative to the working directory
pub const DEFAULT_OUTPUT_PATH: &str = "web.png";

/// Default QR image size in pixels (square)
pub const DEFAULT_QR_SIZE: u32 = 350;

/// Everything one pipeline run needs besides the user's answers
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Key-value file holding the `db.*` connection keys
    pub config_path: PathBuf,
    pub output_path: PathBuf,
    pub qr_width: u32,
    pub qr_height: u32,
    pub api_endpoint: String,
    pub api_key: Option<String>,
    pub http_timeout: Duration,
}

impl PipelineSettings {
    /// Compiled defaults, reading database keys from `config_path`
    pub fn with_defaults(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            qr_width: DEFAULT_QR_SIZE,
            qr_height: DEFAULT_QR_SIZE,
            api_endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: None,
            http_timeout: REQUEST_TIMEOUT,
        }
    }

    /// Resolve settings from the bootstrap config plus environment
    pub fn resolve(config_path: &Path, toml_config: &TomlConfig) -> Self {
        let mut settings = Self::with_defaults(config_path);

        if let Some(path) = &toml_config.output.path {
            settings.output_path = path.clone();
        }
        if let Some(width) = toml_config.output.width {
            settings.qr_width = width;
        }
        if let Some(height) = toml_config.output.height {
            settings.qr_height = height;
        }
        if let Some(endpoint) = &toml_config.api.endpoint {
            if !endpoint.trim().is_empty() {
                settings.api_endpoint = endpoint.clone();
            }
        }

        settings.api_key = resolve_api_key(toml_config);
        settings
    }
}

/// Resolve the summary API key
///
/// **Priority:** ENV → TOML
pub fn resolve_api_key(toml_config: &TomlConfig) -> Option<String> {
    let env_key = std::env::var(API_KEY_ENV_VAR).ok().filter(|k| is_valid_key(k));
    let toml_key = toml_config.api.key.clone().filter(|k| is_valid_key(k));

    if env_key.is_some() && toml_key.is_some() {
        warn!(
            "API key found in both {} and TOML config. Using environment variable.",
            API_KEY_ENV_VAR
        );
    }

    if let Some(key) = env_key {
        info!("API key loaded from environment variable");
        return Some(key);
    }
    if let Some(key) = toml_key {
        info!("API key loaded from TOML config");
        return Some(key);
    }

    warn!(
        "Summary API key not configured. Set {} or `api.key` in the config file.",
        API_KEY_ENV_VAR
    );
    None
}

/// Non-empty, non-whitespace
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}
