//! Tracing subscriber setup.
//!
//! `RUST_LOG` takes precedence over the configured level. In interactive mode
//! logs must not reach the terminal the UI draws on, so they go to the
//! configured file or nowhere.

use crate::cli::RunMode;
use crate::config::LoggingConfig;
use crate::error::Result;
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

fn make_writer(config: &LoggingConfig, mode: RunMode) -> Result<BoxMakeWriter> {
    if let Some(path) = &config.file {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        return Ok(BoxMakeWriter::new(Mutex::new(file)));
    }

    Ok(match mode {
        RunMode::Daemon => BoxMakeWriter::new(std::io::stderr),
        RunMode::Interactive => BoxMakeWriter::new(std::io::sink),
    })
}

/// Install the global subscriber
pub fn init(config: &LoggingConfig, mode: RunMode) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| anyhow::anyhow!("invalid log filter '{}': {}", config.level, e))?;

    let writer = make_writer(config, mode)?;
    let ansi = config.file.is_none() && mode == RunMode::Daemon && atty::is(atty::Stream::Stderr);
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(ansi);

    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {}", e))?;
    Ok(())
}
