//! Developer-facing diagnostic channel for failed cycles.

use crate::error::CycleError;

/// Sink for cycle failures
pub trait DiagnosticSink: Send + Sync {
    /// Report one failed cycle
    fn report(&self, message: &str, error: &CycleError);
}

/// Default sink: one error-level tracing event per failure
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, message: &str, error: &CycleError) {
        tracing::error!(error = %error, "{}", message);
    }
}
