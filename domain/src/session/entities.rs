//! Message entities exchanged with the model

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Role of a message in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        }
    }
}

/// Function-call envelope emitted by the assistant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    pub args: Map<String, Value>,
    pub call_id: String,
}

/// Wrapper around a tool's result inside a function response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionResult {
    pub result: Value,
}

/// Function-response envelope answering a [`FunctionCall`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionResponse {
    pub name: String,
    pub response: FunctionResult,
    pub call_id: String,
}

/// One structured part of a message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentPart {
    FunctionCall(FunctionCall),
    FunctionResponse(FunctionResponse),
}

impl ContentPart {
    pub fn call_id(&self) -> &str {
        match self {
            ContentPart::FunctionCall(call) => &call.call_id,
            ContentPart::FunctionResponse(response) => &response.call_id,
        }
    }
}

/// Message content: plain text or structured parts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

/// A message in a conversation (Entity)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: MessageContent,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self::text(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::text(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::text(Role::Assistant, content)
    }

    /// Assistant message carrying a single function call
    pub fn function_call(
        name: impl Into<String>,
        args: Map<String, Value>,
        call_id: impl Into<String>,
    ) -> Self {
        Self {
            role: Role::Assistant,
            content: MessageContent::Parts(vec![ContentPart::FunctionCall(FunctionCall {
                name: name.into(),
                args,
                call_id: call_id.into(),
            })]),
        }
    }

    /// Tool message answering a function call
    pub fn function_response(
        name: impl Into<String>,
        result: Value,
        call_id: impl Into<String>,
    ) -> Self {
        Self {
            role: Role::Tool,
            content: MessageContent::Parts(vec![ContentPart::FunctionResponse(FunctionResponse {
                name: name.into(),
                response: FunctionResult { result },
                call_id: call_id.into(),
            })]),
        }
    }

    fn text(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: MessageContent::Text(content.into()),
        }
    }

    /// Text content, if this is a plain text message
    pub fn as_text(&self) -> Option<&str> {
        match &self.content {
            MessageContent::Text(text) => Some(text),
            MessageContent::Parts(_) => None,
        }
    }

    pub fn parts(&self) -> &[ContentPart] {
        match &self.content {
            MessageContent::Text(_) => &[],
            MessageContent::Parts(parts) => parts,
        }
    }
}
