//! LLM Gateway port
//!
//! Defines the interface for streaming generations from model providers.

use async_trait::async_trait;
use docent_domain::{ExposedToolSchema, Message, ProviderKind, StreamEvent};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors that can occur during LLM gateway operations
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Timeout")]
    Timeout,

    #[error("Other error: {0}")]
    Other(String),
}

/// Gateway for LLM communication
///
/// This port defines how the application layer talks to a model vendor.
/// Implementations (adapters) live in the infrastructure layer and own
/// their own timeouts and retries.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Vendor this gateway talks to; selects the tool call parser.
    fn provider(&self) -> ProviderKind;

    /// Start a streaming generation.
    ///
    /// Tool call instructions are delivered fully assembled as
    /// [`StreamEvent::ToolCall`]; the stream ends with `Completed` or `Error`.
    async fn stream_generate(
        &self,
        model: &str,
        messages: &[Message],
        tools: &[ExposedToolSchema],
    ) -> Result<StreamHandle, GatewayError>;

    /// Observable state for diagnostics (never includes credentials).
    fn snapshot(&self) -> Value {
        serde_json::json!({ "provider": self.provider().as_str() })
    }
}

/// Handle for receiving streaming events from a model.
///
/// Wraps an `mpsc::Receiver<StreamEvent>`. The model is only asked for more
/// output when the consumer pulls the next event.
pub struct StreamHandle {
    pub receiver: mpsc::Receiver<StreamEvent>,
}

impl StreamHandle {
    pub fn new(receiver: mpsc::Receiver<StreamEvent>) -> Self {
        Self { receiver }
    }

    /// Receive the next event; `None` once the producer is gone.
    pub async fn next_event(&mut self) -> Option<StreamEvent> {
        self.receiver.recv().await
    }
}
