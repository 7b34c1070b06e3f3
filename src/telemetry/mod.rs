//! Startup metrics events.

use std::sync::Mutex;
use tracing::info;

/// Sink for named metric events.
pub trait MetricsLogger: Send + Sync {
    /// Record one occurrence of `event`.
    fn log_event(&self, event: &str);
}

/// [`MetricsLogger`] that forwards events to the tracing pipeline.
#[derive(Debug, Default)]
pub struct TracingMetrics;

impl TracingMetrics {
    /// Create a new tracing-backed metrics logger.
    pub fn new() -> Self {
        Self
    }
}

impl MetricsLogger for TracingMetrics {
    fn log_event(&self, event: &str) {
        info!(metric = event, "metric event");
    }
}

/// [`MetricsLogger`] that captures events in memory for inspection.
#[derive(Debug, Default)]
pub struct InMemoryMetrics {
    events: Mutex<Vec<String>>,
}

impl InMemoryMetrics {
    /// Create an empty capture sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events recorded so far, in order.
    pub fn events(&self) -> Vec<String> {
        self.events.lock().expect("metrics lock poisoned").clone()
    }
}

impl MetricsLogger for InMemoryMetrics {
    fn log_event(&self, event: &str) {
        self.events
            .lock()
            .expect("metrics lock poisoned")
            .push(event.to_string());
    }
}

/// Build the startup runtime-stack event name for a resolved language and
/// optional worker runtime version.
pub fn runtime_stack_event(language: &str, version: Option<&str>) -> String {
    match version {
        Some(version) if !version.is_empty() => {
            format!("host.startup.runtime.language.{language}-{version}")
        }
        _ => format!("host.startup.runtime.language.{language}"),
    }
}
