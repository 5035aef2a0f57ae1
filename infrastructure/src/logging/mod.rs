//! Logging infrastructure: structured component diagnostics.
//!
//! Provides [`JsonlDiagnosticsSink`], a JSONL file writer that implements
//! the [`DiagnosticsSink`](docent_application::DiagnosticsSink) port.

mod jsonl_logger;

pub use jsonl_logger::JsonlDiagnosticsSink;
