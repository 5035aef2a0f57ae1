//! Invocation shaping: which configuration and call-time arguments a
//! tool backend receives.
//!
//! ```text
//! api_tool   → config {url, method, headers, query_params}, args = body
//! other kind → config = tool.config,                        args = parameters
//! ```

use super::binding::BoundParameters;
use super::entities::{ToolAction, ToolDefinition};
use serde_json::{Map, Value};
use thiserror::Error;

const DEFAULT_METHOD: &str = "GET";

/// Errors raised when a stored tool cannot be turned into an invocation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvocationError {
    #[error("api_tool action '{action}' of tool '{tool_id}' has no target url")]
    MissingEndpoint { tool_id: String, action: String },
}

/// Everything a tool backend needs to execute one action
#[derive(Debug, Clone, PartialEq)]
pub struct ToolInvocation {
    /// Tool kind used to load the backend
    pub kind: String,
    /// Backend configuration
    pub config: Value,
    pub action_name: String,
    /// Call-time arguments
    pub arguments: Map<String, Value>,
}

impl ToolInvocation {
    pub fn prepare(
        tool: &ToolDefinition,
        action: &ToolAction,
        bound: BoundParameters,
    ) -> Result<Self, InvocationError> {
        if tool.is_api_tool() {
            let url = action
                .url
                .clone()
                .ok_or_else(|| InvocationError::MissingEndpoint {
                    tool_id: tool.id.to_string(),
                    action: action.name.clone(),
                })?;
            let method = action
                .method
                .clone()
                .unwrap_or_else(|| DEFAULT_METHOD.to_string());

            let mut config = Map::new();
            config.insert("url".to_string(), Value::String(url));
            config.insert("method".to_string(), Value::String(method));
            config.insert("headers".to_string(), Value::Object(bound.headers));
            config.insert("query_params".to_string(), Value::Object(bound.query_params));

            Ok(Self {
                kind: tool.name.clone(),
                config: Value::Object(config),
                action_name: action.name.clone(),
                arguments: bound.body,
            })
        } else {
            Ok(Self {
                kind: tool.name.clone(),
                config: Value::Object(tool.config.clone()),
                action_name: action.name.clone(),
                arguments: bound.parameters,
            })
        }
    }
}
