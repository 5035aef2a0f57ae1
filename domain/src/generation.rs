//! Events produced by a generation, in order, to the caller.

use crate::retrieval::RetrievedDocument;
use crate::tool::record::ToolCallRecord;
use serde::{Deserialize, Serialize};

/// One item of a generation's output sequence.
///
/// Serialized as `{"type": "...", "data": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum GenerationEvent {
    /// A text fragment of the model's answer
    Answer(String),
    /// A tool call was executed and recorded
    ToolCall(ToolCallRecord),
    /// The model kept requesting tools past the configured bound
    RoundLimitReached { limit: usize },
    /// Documents that backed the answer
    Sources(Vec<RetrievedDocument>),
    /// Every call recorded during the generation
    ToolCalls(Vec<ToolCallRecord>),
}

impl GenerationEvent {
    pub fn answer_text(&self) -> Option<&str> {
        match self {
            GenerationEvent::Answer(text) => Some(text),
            _ => None,
        }
    }
}
