//! Gateway for vendors that speak the OpenAI chat-completions protocol.

use super::sse::SseDecoder;
use async_trait::async_trait;
use docent_application::ports::llm_gateway::{GatewayError, LlmGateway, StreamHandle};
use docent_domain::util::preview;
use docent_domain::{ContentPart, ExposedToolSchema, Message, MessageContent, ProviderKind, StreamEvent};
use serde_json::{Value, json};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Events buffered between the network reader and the consumer
const CHANNEL_CAPACITY: usize = 64;

/// Streaming chat-completions client
pub struct OpenAiCompatibleGateway {
    provider: ProviderKind,
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl OpenAiCompatibleGateway {
    pub fn new(
        provider: ProviderKind,
        base_url: impl Into<String>,
        api_key: Option<String>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            provider,
            base_url: base_url.into(),
            api_key,
            client,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl LlmGateway for OpenAiCompatibleGateway {
    fn provider(&self) -> ProviderKind {
        self.provider
    }

    async fn stream_generate(
        &self,
        model: &str,
        messages: &[Message],
        tools: &[ExposedToolSchema],
    ) -> Result<StreamHandle, GatewayError> {
        let body = request_body(model, messages, tools);
        info!(
            "Streaming {} ({} messages, {} tools)",
            model,
            messages.len(),
            tools.len()
        );

        let mut request = self.client.post(self.endpoint()).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                GatewayError::Timeout
            } else if e.is_connect() {
                GatewayError::ConnectionError(e.to_string())
            } else {
                GatewayError::RequestFailed(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(GatewayError::RequestFailed(format!(
                "HTTP {}: {}",
                status.as_u16(),
                preview(&text, 500)
            )));
        }

        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        tokio::spawn(pump(response, tx));
        Ok(StreamHandle::new(rx))
    }

    fn snapshot(&self) -> Value {
        json!({
            "provider": self.provider.as_str(),
            "base_url": self.base_url,
        })
    }
}

/// Read the response body into the channel until a terminal event or
/// until the consumer goes away.
async fn pump(mut response: reqwest::Response, tx: mpsc::Sender<StreamEvent>) {
    let mut decoder = SseDecoder::new();
    loop {
        let events = match response.chunk().await {
            Ok(Some(bytes)) => decoder.feed(&bytes),
            Ok(None) => decoder.finish(),
            Err(e) => {
                warn!("Model stream interrupted: {}", e);
                vec![StreamEvent::Error(format!("Stream read error: {}", e))]
            }
        };

        for event in events {
            let terminal = event.is_terminal();
            if tx.send(event).await.is_err() {
                debug!("Stream consumer dropped; closing model response");
                return;
            }
            if terminal {
                return;
            }
        }
    }
}

fn request_body(model: &str, messages: &[Message], tools: &[ExposedToolSchema]) -> Value {
    let mut body = json!({
        "model": model,
        "messages": wire_messages(messages),
        "stream": true,
    });
    if !tools.is_empty() {
        body["tools"] = Value::Array(tools.iter().map(wire_tool).collect());
    }
    body
}

/// Convert transcript messages into chat-completions messages.
///
/// Each function call part becomes an assistant message carrying one
/// `tool_calls` entry; each function response becomes a `tool` message.
/// Arguments and results are sent JSON-encoded.
fn wire_messages(messages: &[Message]) -> Vec<Value> {
    let mut wire = Vec::with_capacity(messages.len());
    for message in messages {
        match &message.content {
            MessageContent::Text(text) => wire.push(json!({
                "role": message.role.as_str(),
                "content": text,
            })),
            MessageContent::Parts(parts) => {
                for part in parts {
                    wire.push(match part {
                        ContentPart::FunctionCall(call) => json!({
                            "role": "assistant",
                            "content": Value::Null,
                            "tool_calls": [{
                                "id": call.call_id,
                                "type": "function",
                                "function": {
                                    "name": call.name,
                                    "arguments": Value::Object(call.args.clone()).to_string(),
                                },
                            }],
                        }),
                        ContentPart::FunctionResponse(response) => json!({
                            "role": "tool",
                            "tool_call_id": response.call_id,
                            "content": response.response.result.to_string(),
                        }),
                    });
                }
            }
        }
    }
    wire
}

fn wire_tool(tool: &ExposedToolSchema) -> Value {
    json!({
        "type": "function",
        "function": {
            "name": tool.name,
            "description": tool.description,
            "parameters": tool.parameters,
        },
    })
}
