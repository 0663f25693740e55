//! Application configuration management.
//!
//! This module handles loading, parsing, and validating the application configuration
//! from a TOML file and `CLIMATE_PANEL__*` environment variables, with support for
//! runtime overrides from CLI arguments.

use crate::error::{ConfigError, Result};
use crate::poller::OverlapPolicy;
use config::{Config, Environment, File, FileFormat, Map};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file looked up when no `--config` is given
pub const DEFAULT_CONFIG_FILE: &str = "climate-panel.toml";

/// Prefix of environment overrides, e.g. `CLIMATE_PANEL__POLLER__INTERVAL_MS`
pub const ENV_PREFIX: &str = "CLIMATE_PANEL";

/// Top-level application configuration
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub poller: PollerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

/// Endpoint polling configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PollerConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_path")]
    pub path: String,
    #[serde(default = "default_interval")]
    pub interval_ms: u64,
    #[serde(default)]
    pub request_timeout_ms: Option<u64>,
    #[serde(default)]
    pub overlap: OverlapPolicy,
    #[serde(default)]
    pub reject_error_status: bool,
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub file: Option<PathBuf>,
    #[serde(default)]
    pub json: bool,
}

/// Terminal UI configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct UiConfig {
    #[serde(default = "default_tick_rate")]
    pub tick_rate_ms: u64,
}

// Default value functions
fn default_base_url() -> String {
    "http://127.0.0.1:80".to_string()
}

fn default_path() -> String {
    "/data".to_string()
}

fn default_interval() -> u64 {
    5000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_tick_rate() -> u64 {
    250
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            path: default_path(),
            interval_ms: default_interval(),
            request_timeout_ms: None,
            overlap: OverlapPolicy::default(),
            reject_error_status: false,
        }
    }
}

impl PollerConfig {
    /// Full URL of the snapshot endpoint
    pub fn endpoint_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.path)
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
            json: false,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: default_tick_rate(),
        }
    }
}

fn invalid(field: &str, message: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        message: message.to_string(),
    }
}

impl AppConfig {
    /// Load configuration from a TOML file layered with environment overrides.
    ///
    /// An explicit `path` must exist; without one, `climate-panel.toml` in the
    /// working directory is used if present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, None)
    }

    /// Load with `env` standing in for the process environment when given
    fn load_with_env(path: Option<&Path>, env: Option<Map<String, String>>) -> Result<Self> {
        let (path, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        let settings = Config::builder()
            .add_source(
                File::from(path.as_path())
                    .format(FileFormat::Toml)
                    .required(required),
            )
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .source(env),
            )
            .build()
            .map_err(ConfigError::Load)?;

        let config: AppConfig = settings.try_deserialize().map_err(ConfigError::Load)?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.poller.interval_ms == 0 {
            return Err(invalid("poller.interval_ms", "must be greater than 0").into());
        }

        if self.poller.request_timeout_ms == Some(0) {
            return Err(invalid("poller.request_timeout_ms", "must be greater than 0").into());
        }

        if !self.poller.base_url.starts_with("http://")
            && !self.poller.base_url.starts_with("https://")
        {
            return Err(invalid("poller.base_url", "must start with http:// or https://").into());
        }

        if !self.poller.path.starts_with('/') {
            return Err(invalid("poller.path", "must start with '/'").into());
        }

        if self.ui.tick_rate_ms == 0 {
            return Err(invalid("ui.tick_rate_ms", "must be greater than 0").into());
        }

        Ok(())
    }

    /// Apply CLI argument overrides to configuration
    pub fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(interval) = cli.interval_ms {
            self.poller.interval_ms = interval;
        }

        if let Some(endpoint) = &cli.endpoint {
            self.poller.base_url = endpoint.clone();
        }

        if let Some(overlap) = cli.overlap {
            self.poller.overlap = overlap;
        }

        if let Some(level) = cli.log_level {
            self.logging.level = level.to_filter_string().to_string();
        }
    }

    /// Render the effective configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self).map_err(ConfigError::Serialize)?)
    }
}
