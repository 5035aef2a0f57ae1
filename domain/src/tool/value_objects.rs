//! Tool domain value objects: backend output and error types
//!
//! These types form the **output side** of the tool pipeline. A backend
//! either returns a [`ToolOutput`] or a [`ToolError`]; the generation loop
//! records errors as call results so the model can react to them.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Error that occurred while loading or executing a tool.
///
/// | Code | Description |
/// |------|-------------|
/// | `INVALID_ARGUMENT` | Missing/wrong parameters or configuration |
/// | `NOT_FOUND` | Unknown tool kind or action |
/// | `EXECUTION_FAILED` | Runtime failure (network error, non-2xx response) |
/// | `TIMEOUT` | Operation timed out |
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolError {
    /// Error code (e.g., "NOT_FOUND", "EXECUTION_FAILED")
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ToolError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    // Common error constructors
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new(
            "NOT_FOUND",
            format!("Resource not found: {}", resource.into()),
        )
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new("INVALID_ARGUMENT", message)
    }

    pub fn execution_failed(message: impl Into<String>) -> Self {
        Self::new("EXECUTION_FAILED", message)
    }

    pub fn timeout(operation: impl Into<String>) -> Self {
        Self::new(
            "TIMEOUT",
            format!("Operation timed out: {}", operation.into()),
        )
    }
}

impl std::fmt::Display for ToolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(details) = &self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for ToolError {}

/// Raw output of a tool backend
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutput {
    Json(Value),
    Text(String),
    Binary(Vec<u8>),
}

/// A tool produced output that cannot be embedded in the transcript
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("tool output of {len} bytes is not valid UTF-8 and cannot be embedded in the transcript")]
pub struct UnrepresentableOutput {
    pub len: usize,
}

impl ToolOutput {
    /// Convert into the JSON value stored in the call record.
    ///
    /// Binary output is accepted only when it is valid UTF-8.
    pub fn into_transcript_value(self) -> Result<Value, UnrepresentableOutput> {
        match self {
            ToolOutput::Json(value) => Ok(value),
            ToolOutput::Text(text) => Ok(Value::String(text)),
            ToolOutput::Binary(bytes) => {
                let len = bytes.len();
                String::from_utf8(bytes)
                    .map(Value::String)
                    .map_err(|_| UnrepresentableOutput { len })
            }
        }
    }
}

impl From<Value> for ToolOutput {
    fn from(value: Value) -> Self {
        ToolOutput::Json(value)
    }
}
