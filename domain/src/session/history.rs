//! Stored conversation history

use crate::tool::record::ToolCallRecord;
use serde::{Deserialize, Serialize};

/// One stored history entry.
///
/// A turn may hold a prompt/response pair, a list of tool call records, or
/// both. Turns are immutable input to a generation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCallRecord>,
}

impl ConversationTurn {
    pub fn exchange(prompt: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            prompt: Some(prompt.into()),
            response: Some(response.into()),
            tool_calls: Vec::new(),
        }
    }

    pub fn with_tool_calls(mut self, records: Vec<ToolCallRecord>) -> Self {
        self.tool_calls = records;
        self
    }

    /// The prompt/response pair, when both halves are present
    pub fn pair(&self) -> Option<(&str, &str)> {
        match (&self.prompt, &self.response) {
            (Some(prompt), Some(response)) => Some((prompt, response)),
            _ => None,
        }
    }
}
