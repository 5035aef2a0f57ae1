//! Tool call records: the append-only log of executed calls.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One executed tool call, as stored in history and fed back to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRecord {
    /// Tool kind (e.g. "api_tool")
    pub tool_name: String,
    /// Links the function call to its response. Older stored records may
    /// lack it; see [`ConversationBuilder`](crate::prompt::ConversationBuilder).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_id: Option<String>,
    /// Composite action name: `{action_name}_{tool_id}`
    pub action_name: String,
    #[serde(default)]
    pub arguments: Map<String, Value>,
    #[serde(default)]
    pub result: Value,
}

impl ToolCallRecord {
    /// Result payload recorded for a failed execution
    pub fn error_result(description: impl Into<String>) -> Value {
        serde_json::json!({ "error": description.into() })
    }

    /// Whether the recorded result describes a failure
    pub fn is_error(&self) -> bool {
        self.result
            .as_object()
            .is_some_and(|obj| obj.len() == 1 && obj.contains_key("error"))
    }
}
