//! Sink for the PAC `alert()` helper.

use std::sync::Arc;

/// Receives messages passed to the PAC script's `alert()` helper.
pub trait AlertSink: Send + Sync {
    fn alert(&self, message: &str);
}

/// Routes `alert()` messages into `tracing`, at `warn` level, under the
/// `rama::pac::alert` target — the same ambient logging pipeline every
/// other diagnostic in this crate uses, rather than writing to stderr
/// directly.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAlertSink;

impl AlertSink for TracingAlertSink {
    fn alert(&self, message: &str) {
        tracing::warn!(target: "rama::pac::alert", "{message}");
    }
}

pub(crate) fn default_sink() -> Arc<dyn AlertSink> {
    Arc::new(TracingAlertSink)
}
