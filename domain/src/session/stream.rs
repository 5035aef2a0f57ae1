//! Streaming events for model communication.
//!
//! [`StreamEvent`] represents individual events in a streaming model
//! response. Vendor adapters normalize their wire format into these events;
//! tool call instructions arrive fully assembled.

use crate::tool::call::ToolCallRequest;

/// An event in a streaming model response.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// A text chunk from the model.
    Delta(String),
    /// A complete tool call instruction.
    ToolCall(ToolCallRequest),
    /// The model finished its turn.
    Completed,
    /// An error that occurred during streaming.
    Error(String),
}

impl StreamEvent {
    /// Returns the text content if this is a Delta event.
    pub fn text(&self) -> Option<&str> {
        match self {
            StreamEvent::Delta(s) => Some(s),
            _ => None,
        }
    }

    /// Returns true if this event signals the end of the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Completed | StreamEvent::Error(_))
    }
}
