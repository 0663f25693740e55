/// Main entry point for the climate panel.
///
/// This function performs the following steps:
/// 1. Parses the command line and loads the configuration file and environment overrides.
/// 2. Installs the tracing subscriber.
/// 3. Starts the poll controller, which fetches a sensor snapshot right away and then on
///    every interval.
/// 4. Renders the readings into the terminal UI, or logs them in daemon mode, until the
///    user quits or a shutdown signal arrives.
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc;

mod cli;
mod config;
mod diagnostics;
mod error;
mod logging;
mod poller;
mod service;
mod snapshot;
mod source;
mod surface;
mod ui;

use crate::cli::{Cli, RunMode};
use crate::config::AppConfig;
use crate::ui::{App, ControlCommand, PanelSurface};

async fn run_interactive(config: &AppConfig) -> Result<()> {
    let surface = Arc::new(PanelSurface::new());
    let controller = service::build_controller(config, surface.clone())?;
    let app = App::new(
        surface,
        config.poller.endpoint_url(),
        config.poller.interval_ms,
        config.poller.overlap,
    );

    let (tx, mut rx) = mpsc::unbounded_channel();
    let shutdown = Arc::new(AtomicBool::new(false));
    let tick_rate = Duration::from_millis(config.ui.tick_rate_ms);
    let mut ui = tokio::task::spawn_blocking({
        let shutdown = shutdown.clone();
        move || ui::run(app, tick_rate, tx, shutdown)
    });

    controller.start();

    let signal = service::wait_for_shutdown_signal();
    tokio::pin!(signal);
    let mut signalled = false;

    let ui_result = loop {
        tokio::select! {
            command = rx.recv() => match command {
                Some(ControlCommand::Start) => {
                    controller.start();
                }
                Some(ControlCommand::Stop) => {
                    controller.stop();
                }
                Some(ControlCommand::Refresh) => controller.refresh(),
                // The UI loop ends right after sending Quit
                Some(ControlCommand::Quit) => {}
                None => break (&mut ui).await,
            },
            result = &mut ui => break result,
            signal_result = &mut signal, if !signalled => {
                signalled = true;
                signal_result?;
                shutdown.store(true, Ordering::SeqCst);
            }
        }
    };

    if controller.is_running() {
        controller.stop();
    }
    ui_result??;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();
    if cli.version {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let mut config = AppConfig::load(cli.config.as_deref())?;
    config.apply_cli_overrides(&cli);
    config.validate()?;

    if cli.print_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    let mut mode = cli.mode;
    if mode == RunMode::Interactive && !atty::is(atty::Stream::Stdout) {
        mode = RunMode::Daemon;
    }
    logging::init(&config.logging, mode)?;
    if mode != cli.mode {
        tracing::warn!("stdout is not a terminal, falling back to daemon mode");
    }

    match mode {
        RunMode::Interactive => run_interactive(&config).await?,
        RunMode::Daemon => service::run_daemon(&config).await?,
    }
    Ok(())
}
