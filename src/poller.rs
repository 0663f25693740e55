//! The fetch-decode-render cycle.
//!
//! `Poller::update_data` runs one cycle: fetch a snapshot from the source,
//! write the three texts into the surface, or report exactly one diagnostic
//! and leave the surface untouched.

use crate::diagnostics::DiagnosticSink;
use crate::error::{CycleError, RenderError};
use crate::snapshot::SensorSnapshot;
use crate::source::SnapshotSource;
use crate::surface::RenderSurface;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// How a cycle behaves while an earlier fetch is still in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverlapPolicy {
    /// Fetches overlap; responses render in the order they resolve
    Allow,
    /// A cycle is dropped while another fetch is in flight
    Skip,
    /// Fetches overlap; a response older than the last rendered one is discarded
    #[default]
    LatestIssued,
}

impl FromStr for OverlapPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "allow" => Ok(OverlapPolicy::Allow),
            "skip" => Ok(OverlapPolicy::Skip),
            "latest-issued" | "latest_issued" => Ok(OverlapPolicy::LatestIssued),
            other => Err(format!(
                "unknown overlap policy '{}' (allow, skip, latest-issued)",
                other
            )),
        }
    }
}

impl fmt::Display for OverlapPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OverlapPolicy::Allow => "allow",
            OverlapPolicy::Skip => "skip",
            OverlapPolicy::LatestIssued => "latest-issued",
        })
    }
}

/// Result of one cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// All three targets were written
    Rendered,
    /// The cycle failed and one diagnostic was reported
    Failed,
    /// Not started because a fetch was in flight
    Skipped,
    /// Fetched, but a later-issued cycle had already rendered
    Stale,
}

/// Decrements the in-flight counter when a cycle ends, however it ends
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Poller/renderer for one source and one surface
pub struct Poller {
    source: Arc<dyn SnapshotSource>,
    surface: Arc<dyn RenderSurface>,
    diagnostics: Arc<dyn DiagnosticSink>,
    policy: OverlapPolicy,
    in_flight: AtomicUsize,
    issued: AtomicU64,
    /// Sequence number of the last rendered cycle, 0 before the first
    last_rendered: Mutex<u64>,
}

impl Poller {
    pub fn new(
        source: Arc<dyn SnapshotSource>,
        surface: Arc<dyn RenderSurface>,
        diagnostics: Arc<dyn DiagnosticSink>,
        policy: OverlapPolicy,
    ) -> Self {
        Self {
            source,
            surface,
            diagnostics,
            policy,
            in_flight: AtomicUsize::new(0),
            issued: AtomicU64::new(0),
            last_rendered: Mutex::new(0),
        }
    }

    /// Number of fetches currently in flight
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Run one fetch-decode-render cycle
    pub async fn update_data(&self) -> CycleOutcome {
        let _guard = match self.policy {
            OverlapPolicy::Skip => {
                if self
                    .in_flight
                    .compare_exchange(0, 1, Ordering::SeqCst, Ordering::SeqCst)
                    .is_err()
                {
                    tracing::debug!("fetch already in flight, skipping cycle");
                    return CycleOutcome::Skipped;
                }
                InFlight(&self.in_flight)
            }
            OverlapPolicy::Allow | OverlapPolicy::LatestIssued => {
                self.in_flight.fetch_add(1, Ordering::SeqCst);
                InFlight(&self.in_flight)
            }
        };
        let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!(seq, "fetching snapshot");

        let result = match self.source.fetch().await {
            Ok(snapshot) => self.render(seq, &snapshot),
            Err(e) => Err(CycleError::from(e)),
        };

        match result {
            Ok(outcome) => outcome,
            Err(e) => {
                self.diagnostics.report("Error fetching data", &e);
                CycleOutcome::Failed
            }
        }
    }

    fn render(&self, seq: u64, snapshot: &SensorSnapshot) -> Result<CycleOutcome, CycleError> {
        let mut last_rendered = self
            .last_rendered
            .lock()
            .map_err(|_| RenderError::Surface("render state poisoned".to_string()))?;

        if self.policy == OverlapPolicy::LatestIssued && seq < *last_rendered {
            tracing::debug!(
                seq,
                last_rendered = *last_rendered,
                "discarding response from an older cycle"
            );
            return Ok(CycleOutcome::Stale);
        }

        self.surface.set_texts(&snapshot.texts())?;
        *last_rendered = (*last_rendered).max(seq);
        tracing::debug!(seq, "snapshot rendered");
        Ok(CycleOutcome::Rendered)
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use crate::error::FetchError;
    use crate::snapshot::FanSpeed;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::time::Duration;

    pub fn snapshot(temperature: f64) -> SensorSnapshot {
        SensorSnapshot {
            temperature,
            humidity: 40.0,
            fan_speed: FanSpeed::Label("low".to_string()),
        }
    }

    /// Source that answers from a script of (delay, snapshot) pairs and counts calls
    pub struct ScriptedSource {
        script: Mutex<VecDeque<(u64, SensorSnapshot)>>,
        calls: AtomicUsize,
    }

    impl ScriptedSource {
        pub fn new(script: Vec<(u64, SensorSnapshot)>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                calls: AtomicUsize::new(0),
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SnapshotSource for ScriptedSource {
        async fn fetch(&self) -> Result<SensorSnapshot, FetchError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            let next = self.script.lock().unwrap().pop_front();
            let (delay_ms, snapshot) = next.unwrap_or((0, snapshot(call as f64)));
            if delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
            Ok(snapshot)
        }
    }
}
