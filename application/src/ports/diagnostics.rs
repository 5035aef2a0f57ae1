//! Port for component diagnostics.
//!
//! Defines the [`DiagnosticsSink`] trait for recording snapshots of the
//! collaborators a generation used (retriever, model gateway, tool
//! handling) in a machine-readable form.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostic messages, while this port captures component
//! state for later inspection (e.g. as JSONL).

use chrono::{DateTime, Utc};
use serde_json::Value;

/// A snapshot of one component's observable state.
#[derive(Debug, Clone)]
pub struct ComponentSnapshot {
    /// Component identifier: `"retriever"`, `"llm"` or `"llm_handler"`.
    pub component: &'static str,
    /// JSON payload with component-specific data.
    pub data: Value,
    pub recorded_at: DateTime<Utc>,
}

impl ComponentSnapshot {
    /// Create a new snapshot stamped with the current UTC time.
    pub fn new(component: &'static str, data: Value) -> Self {
        Self {
            component,
            data,
            recorded_at: Utc::now(),
        }
    }
}

/// Port for recording component snapshots.
///
/// `record` is synchronous and non-fallible: a sink must never block or
/// alter the outcome of a generation, so failures are swallowed.
pub trait DiagnosticsSink: Send + Sync {
    fn record(&self, snapshot: ComponentSnapshot);
}

/// No-op implementation for tests and when diagnostics are disabled.
pub struct NoDiagnostics;

impl DiagnosticsSink for NoDiagnostics {
    fn record(&self, _snapshot: ComponentSnapshot) {}
}
