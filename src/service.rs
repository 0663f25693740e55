//! Service layer driving the poller on a fixed interval.
//!
//! This module provides the `PollController` that owns the repeating timer,
//! and the runners for interactive (with UI) and daemon (headless) mode.

use crate::config::AppConfig;
use crate::diagnostics::TracingSink;
use crate::error::{Result, ServiceError};
use crate::poller::Poller;
use crate::source::HttpSource;
use crate::surface::{LogSurface, RenderSurface};
use futures_util::StreamExt;
use signal_hook::consts::signal::{SIGINT, SIGTERM};
use signal_hook_tokio::Signals;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

struct RunningTimer {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Explicit owner of the polling timer
pub struct PollController {
    poller: Arc<Poller>,
    interval: Duration,
    timer: Mutex<Option<RunningTimer>>,
}

impl PollController {
    pub fn new(poller: Arc<Poller>, interval: Duration) -> Self {
        Self {
            poller,
            interval,
            timer: Mutex::new(None),
        }
    }

    /// Start polling: one cycle right away, then one per interval.
    ///
    /// Returns `false` if the timer was already running. Must be called
    /// from within a tokio runtime.
    pub fn start(&self) -> bool {
        let mut timer = self.timer.lock().unwrap_or_else(|e| e.into_inner());
        if timer.as_ref().is_some_and(|t| !t.handle.is_finished()) {
            return false;
        }

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_timer(
            self.poller.clone(),
            self.interval,
            cancel.clone(),
        ));
        *timer = Some(RunningTimer { cancel, handle });
        tracing::info!(interval_ms = self.interval.as_millis() as u64, "polling started");
        true
    }

    /// Stop the timer. Fetches already in flight still complete.
    ///
    /// Returns `false` if the timer was not running.
    pub fn stop(&self) -> bool {
        let mut timer = self.timer.lock().unwrap_or_else(|e| e.into_inner());
        match timer.take() {
            Some(running) => {
                running.cancel.cancel();
                tracing::info!(in_flight = self.poller.in_flight(), "polling stopped");
                true
            }
            None => false,
        }
    }

    /// Whether the timer is running
    pub fn is_running(&self) -> bool {
        self.timer
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .is_some_and(|t| !t.handle.is_finished())
    }

    /// Run one cycle outside the timer
    pub fn refresh(&self) {
        let poller = self.poller.clone();
        tokio::spawn(async move {
            poller.update_data().await;
        });
    }
}

impl Drop for PollController {
    fn drop(&mut self) {
        if let Ok(mut timer) = self.timer.lock() {
            if let Some(running) = timer.take() {
                running.cancel.cancel();
            }
        }
    }
}

/// Timer loop. The first tick of a tokio interval completes immediately,
/// which gives the initial cycle.
async fn run_timer(poller: Arc<Poller>, period: Duration, cancel: CancellationToken) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                let poller = poller.clone();
                tokio::spawn(async move {
                    poller.update_data().await;
                });
            }
        }
    }
}

/// Build a controller polling the configured endpoint into `surface`
pub fn build_controller(
    config: &AppConfig,
    surface: Arc<dyn RenderSurface>,
) -> Result<PollController> {
    let source = HttpSource::new(&config.poller)?;
    tracing::info!(
        url = source.url(),
        overlap = %config.poller.overlap,
        "polling endpoint"
    );
    let poller = Poller::new(
        Arc::new(source),
        surface,
        Arc::new(TracingSink),
        config.poller.overlap,
    );
    Ok(PollController::new(
        Arc::new(poller),
        Duration::from_millis(config.poller.interval_ms),
    ))
}

/// Wait for SIGINT or SIGTERM
pub async fn wait_for_shutdown_signal() -> Result<()> {
    let mut signals = Signals::new([SIGINT, SIGTERM])
        .map_err(|e| ServiceError::SignalError(e.to_string()))?;
    let handle = signals.handle();

    if let Some(signal) = signals.next().await {
        tracing::info!(signal, "Received shutdown signal");
    }
    handle.close();
    Ok(())
}

/// Run the service in daemon mode until a shutdown signal arrives
pub async fn run_daemon(config: &AppConfig) -> Result<()> {
    tracing::info!("Starting climate panel in daemon mode");
    let controller = build_controller(config, Arc::new(LogSurface::new()))?;

    controller.start();
    wait_for_shutdown_signal().await?;
    controller.stop();

    tracing::info!("Climate panel stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poller::testing::ScriptedSource;
    use crate::poller::OverlapPolicy;
    use crate::surface::{MemorySurface, Target};

    fn controller(interval_ms: u64) -> (PollController, Arc<ScriptedSource>, Arc<MemorySurface>) {
        let source = Arc::new(ScriptedSource::new(Vec::new()));
        let surface = Arc::new(MemorySurface::new());
        let poller = Poller::new(
            source.clone(),
            surface.clone(),
            Arc::new(TracingSink),
            OverlapPolicy::default(),
        );
        let controller = PollController::new(Arc::new(poller), Duration::from_millis(interval_ms));
        (controller, source, surface)
    }

    async fn advance_ms(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_renders_before_first_tick() {
        let (controller, source, surface) = controller(5000);
        assert!(controller.start());

        advance_ms(1).await;
        assert_eq!(source.calls(), 1);
        assert_eq!(surface.text(Target::Temperature).as_deref(), Some("1°C"));
        assert_eq!(surface.text(Target::Humidity).as_deref(), Some("40%"));
        assert_eq!(surface.text(Target::FanSpeed).as_deref(), Some("low"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_cycle_per_interval() {
        let (controller, source, _surface) = controller(5000);
        controller.start();

        advance_ms(1).await;
        assert_eq!(source.calls(), 1);

        advance_ms(4998).await;
        assert_eq!(source.calls(), 1);

        advance_ms(2).await;
        assert_eq!(source.calls(), 2);

        advance_ms(15_000).await;
        assert_eq!(source.calls(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_halts_timer() {
        let (controller, source, _surface) = controller(5000);
        controller.start();
        advance_ms(5001).await;
        assert_eq!(source.calls(), 2);

        assert!(controller.stop());
        assert!(!controller.is_running());
        advance_ms(20_000).await;
        assert_eq!(source.calls(), 2);
        assert!(!controller.stop());
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_is_idempotent_and_restartable() {
        let (controller, source, _surface) = controller(5000);
        assert!(controller.start());
        assert!(!controller.start());
        advance_ms(1).await;
        assert_eq!(source.calls(), 1);
        assert!(controller.is_running());

        controller.stop();
        assert!(controller.start());
        advance_ms(1).await;
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_runs_one_extra_cycle() {
        let (controller, source, surface) = controller(5000);
        controller.refresh();
        advance_ms(1).await;
        assert_eq!(source.calls(), 1);
        assert!(!controller.is_running());
        assert_eq!(surface.text(Target::Temperature).as_deref(), Some("1°C"));
    }
}
