//! `api_tool`: calls an HTTP endpoint described by a stored action.
//!
//! The endpoint, method, headers and query parameters are fixed in the
//! tool's configuration when it is loaded; the call-time arguments become
//! the JSON request body.

use async_trait::async_trait;
use docent_application::ports::tool_loader::Tool;
use docent_domain::util::preview;
use docent_domain::{ToolError, ToolOutput};
use reqwest::Method;
use serde_json::{Map, Value, json};
use tracing::debug;

const SUCCESS_MESSAGE: &str = "API call successful.";

/// Configuration baked into an [`ApiTool`]
#[derive(Debug, Clone, PartialEq)]
pub struct ApiToolConfig {
    pub url: String,
    pub method: Method,
    pub headers: Vec<(String, String)>,
    pub query_params: Vec<(String, String)>,
}

impl ApiToolConfig {
    /// Parse `{url, method, headers, query_params}`.
    pub fn from_value(config: &Value) -> Result<Self, ToolError> {
        let url = config
            .get("url")
            .and_then(Value::as_str)
            .filter(|url| !url.is_empty())
            .ok_or_else(|| ToolError::invalid_argument("api_tool config requires a 'url'"))?
            .to_string();

        let method_name = config
            .get("method")
            .and_then(Value::as_str)
            .unwrap_or("GET")
            .to_uppercase();
        let method = Method::from_bytes(method_name.as_bytes()).map_err(|_| {
            ToolError::invalid_argument(format!("invalid HTTP method '{}'", method_name))
        })?;

        Ok(Self {
            url,
            method,
            headers: string_pairs(config.get("headers")),
            query_params: string_pairs(config.get("query_params")),
        })
    }
}

/// Flatten a JSON object into string pairs; strings are used verbatim,
/// other values in their JSON form. Nulls are skipped.
fn string_pairs(value: Option<&Value>) -> Vec<(String, String)> {
    let Some(Value::Object(map)) = value else {
        return Vec::new();
    };
    map.iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(k, v)| {
            let text = match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (k.clone(), text)
        })
        .collect()
}

/// HTTP API calling tool
pub struct ApiTool {
    client: reqwest::Client,
    config: ApiToolConfig,
}

impl ApiTool {
    pub fn new(client: reqwest::Client, config: ApiToolConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl Tool for ApiTool {
    async fn execute(
        &self,
        action_name: &str,
        arguments: &Map<String, Value>,
    ) -> Result<ToolOutput, ToolError> {
        let config = &self.config;
        debug!(
            "Calling API for {}: {} {}",
            action_name, config.method, config.url
        );

        let mut request = self
            .client
            .request(config.method.clone(), &config.url)
            .query(&config.query_params);
        for (name, value) in &config.headers {
            request = request.header(name, value);
        }
        if !arguments.is_empty() {
            request = request.json(arguments);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ToolError::timeout(format!("{} {}", config.method, config.url))
            } else {
                ToolError::execution_failed(format!("API call failed: {}", e))
            }
        })?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_ascii_lowercase();
        let body = response.bytes().await.map_err(|e| {
            ToolError::execution_failed(format!("Failed to read response body: {}", e))
        })?;

        if !status.is_success() {
            let text = String::from_utf8_lossy(&body);
            return Err(ToolError::execution_failed(format!(
                "HTTP error: {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            ))
            .with_details(preview(&text, 200).into_owned()));
        }

        let wrap = |data: Value, message: String| {
            ToolOutput::Json(json!({
                "status_code": status.as_u16(),
                "data": data,
                "message": message,
            }))
        };

        if is_json(&content_type) {
            return Ok(match serde_json::from_slice::<Value>(&body) {
                Ok(data) => wrap(data, SUCCESS_MESSAGE.to_string()),
                Err(e) => wrap(
                    Value::String(String::from_utf8_lossy(&body).into_owned()),
                    format!("API call returned invalid JSON. Error: {}", e),
                ),
            });
        }
        if is_textual(&content_type) {
            return Ok(match String::from_utf8(body.to_vec()) {
                Ok(text) => wrap(Value::String(text), SUCCESS_MESSAGE.to_string()),
                Err(e) => ToolOutput::Binary(e.into_bytes()),
            });
        }

        Ok(ToolOutput::Binary(body.to_vec()))
    }
}

fn is_json(content_type: &str) -> bool {
    content_type.starts_with("application/json") || content_type.contains("+json")
}

fn is_textual(content_type: &str) -> bool {
    content_type.is_empty()
        || content_type.starts_with("text/")
        || content_type.contains("xml")
        || content_type.contains("javascript")
}
