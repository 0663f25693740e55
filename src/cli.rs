//! Command-line interface argument parsing.
//!
//! This module defines the CLI structure and parsing logic using gumdrop,
//! supporting different run modes and configuration options.

use crate::poller::OverlapPolicy;
use gumdrop::Options;
use std::path::PathBuf;
use std::str::FromStr;

/// Run mode for the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Interactive terminal UI mode (default)
    Interactive,
    /// Background daemon mode (no UI, logs only)
    Daemon,
}

impl FromStr for RunMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "interactive" => Ok(RunMode::Interactive),
            "daemon" => Ok(RunMode::Daemon),
            other => Err(format!("unknown run mode '{}' (interactive, daemon)", other)),
        }
    }
}

/// Log level for the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Convert LogLevel to an EnvFilter directive
    pub fn to_filter_string(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

/// climate-panel: poll a sensor endpoint and display temperature, humidity and fan speed
#[derive(Debug, Options)]
pub struct Cli {
    #[options(help_flag, help = "print this help message")]
    pub help: bool,

    #[options(no_short, help = "print version and exit")]
    pub version: bool,

    #[options(
        meta = "MODE",
        default = "interactive",
        help = "run mode: interactive or daemon"
    )]
    pub mode: RunMode,

    #[options(meta = "PATH", help = "path to TOML configuration file")]
    pub config: Option<PathBuf>,

    #[options(meta = "LEVEL", help = "log level: trace, debug, info, warn, error")]
    pub log_level: Option<LogLevel>,

    #[options(meta = "MS", help = "poll interval in milliseconds (overrides config)")]
    pub interval_ms: Option<u64>,

    #[options(meta = "URL", help = "endpoint base URL (overrides config)")]
    pub endpoint: Option<String>,

    #[options(
        no_short,
        meta = "POLICY",
        help = "overlapping fetches: allow, skip, latest-issued"
    )]
    pub overlap: Option<OverlapPolicy>,

    #[options(no_short, help = "print the effective configuration as TOML and exit")]
    pub print_config: bool,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse_args_default_or_exit()
    }
}
