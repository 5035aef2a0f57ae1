//! Function-call requests and their vendor-specific resolution.
//!
//! Every vendor encodes function calls a little differently. The
//! [`ToolCallParser`] is chosen once per generation from the configured
//! [`ProviderKind`] and maps a raw [`ToolCallRequest`] onto
//! `(tool_id, action_name, arguments)`.
//!
//! | Parser | Arguments encoding |
//! |--------|--------------------|
//! | `OpenAi` | JSON-encoded string (`""` means no arguments) |
//! | `Google` | JSON object, or absent |
//! | `Anthropic` | JSON object |

use super::entities::ToolId;
use crate::core::provider::ProviderKind;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// A model-emitted instruction to call one exposed function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// Vendor-assigned call id (Google omits it)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Composite function name: `{action_name}_{tool_id}`
    pub name: String,
    /// Arguments exactly as the vendor encoded them
    #[serde(default)]
    pub arguments: Value,
}

impl ToolCallRequest {
    pub fn new(name: impl Into<String>, arguments: impl Into<Value>) -> Self {
        Self {
            id: None,
            name: name.into(),
            arguments: arguments.into(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Errors raised while mapping a call onto a known tool action
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("function '{0}' does not match any active tool")]
    UnknownTool(String),

    #[error("function '{0}' has no action name before the tool id")]
    MissingActionName(String),

    #[error("arguments for '{name}' are not a JSON object: {reason}")]
    MalformedArguments { name: String, reason: String },
}

/// A call mapped onto a concrete tool and action
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedCall {
    pub tool_id: ToolId,
    pub action_name: String,
    pub arguments: Map<String, Value>,
}

/// Vendor-specific function-call parser
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolCallParser {
    OpenAi,
    Google,
    Anthropic,
}

impl ToolCallParser {
    /// Select the parser for the configured model vendor
    pub fn for_provider(provider: ProviderKind) -> Self {
        match provider {
            ProviderKind::Google => ToolCallParser::Google,
            ProviderKind::Anthropic => ToolCallParser::Anthropic,
            _ => ToolCallParser::OpenAi,
        }
    }

    /// Resolve a call against the ids of the tools known to this generation.
    ///
    /// The tool id is the longest known id `x` such that the name ends with
    /// `_x`; everything before that separator is the action name.
    pub fn parse<'a>(
        &self,
        call: &ToolCallRequest,
        known_tool_ids: impl IntoIterator<Item = &'a ToolId>,
    ) -> Result<ResolvedCall, ParseError> {
        let (tool_id, action_name) = split_composite_name(&call.name, known_tool_ids)?;
        let arguments = self.parse_arguments(call)?;
        Ok(ResolvedCall {
            tool_id,
            action_name,
            arguments,
        })
    }

    fn parse_arguments(&self, call: &ToolCallRequest) -> Result<Map<String, Value>, ParseError> {
        let malformed = |reason: String| ParseError::MalformedArguments {
            name: call.name.clone(),
            reason,
        };

        match (self, &call.arguments) {
            (ToolCallParser::OpenAi, Value::String(raw)) => {
                if raw.trim().is_empty() {
                    return Ok(Map::new());
                }
                match serde_json::from_str::<Value>(raw) {
                    Ok(Value::Object(map)) => Ok(map),
                    Ok(other) => Err(malformed(format!("decoded to {}", json_kind(&other)))),
                    Err(e) => Err(malformed(e.to_string())),
                }
            }
            (ToolCallParser::OpenAi, other) => Err(malformed(format!(
                "expected an encoded string, got {}",
                json_kind(other)
            ))),
            (ToolCallParser::Google, Value::Null) => Ok(Map::new()),
            (ToolCallParser::Google | ToolCallParser::Anthropic, Value::Object(map)) => {
                Ok(map.clone())
            }
            (_, other) => Err(malformed(format!("got {}", json_kind(other)))),
        }
    }
}

fn split_composite_name<'a>(
    name: &str,
    known_tool_ids: impl IntoIterator<Item = &'a ToolId>,
) -> Result<(ToolId, String), ParseError> {
    let matched = known_tool_ids
        .into_iter()
        .filter(|id| {
            let id = id.as_str();
            !id.is_empty()
                && name.len() > id.len()
                && name.ends_with(id)
                && name[..name.len() - id.len()].ends_with('_')
        })
        .max_by_key(|id| id.as_str().len())
        .ok_or_else(|| ParseError::UnknownTool(name.to_string()))?;

    let action_name = &name[..name.len() - matched.as_str().len() - 1];
    if action_name.is_empty() {
        return Err(ParseError::MissingActionName(name.to_string()));
    }
    Ok((matched.clone(), action_name.to_string()))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
