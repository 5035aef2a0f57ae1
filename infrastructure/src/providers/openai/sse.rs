//! Incremental decoder for chat-completions server-sent events.
//!
//! Bytes go in as they arrive from the network; [`StreamEvent`]s come out.
//! Tool call fragments are accumulated per index and released, fully
//! assembled and in index order, when the model finishes its turn.

use docent_domain::{StreamEvent, ToolCallRequest};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

/// Maximum size of undecoded input before the stream is aborted.
const MAX_BUF: usize = 16 * 1024 * 1024; // 16 MiB

#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
    #[serde(default)]
    error: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: ChunkDelta,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ToolCallDelta>>,
}

#[derive(Debug, Deserialize)]
struct ToolCallDelta {
    #[serde(default)]
    index: u32,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    function: Option<FunctionDelta>,
}

#[derive(Debug, Deserialize)]
struct FunctionDelta {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    arguments: Option<String>,
}

/// State tracked per in-flight tool call.
#[derive(Debug, Default)]
struct ToolCallState {
    id: String,
    name: String,
    arguments_buffer: String,
}

impl ToolCallState {
    fn into_request(self) -> ToolCallRequest {
        let request = ToolCallRequest::new(self.name, Value::String(self.arguments_buffer));
        if self.id.is_empty() {
            request
        } else {
            request.with_id(self.id)
        }
    }
}

/// Server-sent event decoder
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: String,
    utf8_buf: Vec<u8>,
    tool_states: BTreeMap<u32, ToolCallState>,
    finished: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a terminal event has been produced.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Decode the next network chunk.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<StreamEvent> {
        if self.finished {
            return Vec::new();
        }

        self.utf8_buf.extend_from_slice(bytes);
        if self.utf8_buf.len() > MAX_BUF || self.buffer.len() > MAX_BUF {
            self.utf8_buf.clear();
            self.buffer.clear();
            return self.terminate(StreamEvent::Error(
                "SSE stream buffer exceeded 16 MiB".to_string(),
            ));
        }
        self.drain_utf8();

        let mut events = Vec::new();
        while let Some(pos) = self.buffer.find("\n\n") {
            let event_text: String = self.buffer.drain(..pos + 2).collect();
            events.extend(self.parse_event(&event_text));
            if self.finished {
                break;
            }
        }
        events
    }

    /// The connection closed; flush whatever is left.
    ///
    /// A body that ends without `[DONE]` or a `finish_reason` was cut off:
    /// pending tool calls are discarded and an error is emitted.
    pub fn finish(&mut self) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        if !self.finished {
            let rest = std::mem::take(&mut self.buffer);
            if !rest.trim().is_empty() {
                events.extend(self.parse_event(&rest));
            }
        }
        if !self.finished {
            debug!(
                "SSE body closed without a terminal event ({} pending tool call(s))",
                self.tool_states.len()
            );
            events.extend(self.terminate(StreamEvent::Error(
                "model stream ended before completion".to_string(),
            )));
        }
        events
    }

    /// Move complete UTF-8 sequences from the byte buffer into the text
    /// buffer, keeping a split trailing sequence for the next chunk.
    fn drain_utf8(&mut self) {
        loop {
            match std::str::from_utf8(&self.utf8_buf) {
                Ok(text) => {
                    push_normalized(&mut self.buffer, text);
                    self.utf8_buf.clear();
                    return;
                }
                Err(e) => {
                    let valid_up_to = e.valid_up_to();
                    if let Ok(valid) = std::str::from_utf8(&self.utf8_buf[..valid_up_to]) {
                        push_normalized(&mut self.buffer, valid);
                    }
                    match e.error_len() {
                        // Permanently invalid bytes are skipped
                        Some(len) => {
                            self.utf8_buf.drain(..valid_up_to + len);
                        }
                        None => {
                            self.utf8_buf.drain(..valid_up_to);
                            return;
                        }
                    }
                }
            }
        }
    }

    fn parse_event(&mut self, event_text: &str) -> Vec<StreamEvent> {
        let Some(data) = extract_data(event_text) else {
            return Vec::new();
        };

        if data == "[DONE]" {
            return self.complete();
        }

        let chunk: StreamChunk = match serde_json::from_str(&data) {
            Ok(chunk) => chunk,
            Err(e) => {
                debug!("Ignoring undecodable SSE chunk: {}", e);
                return Vec::new();
            }
        };

        if let Some(error) = chunk.error {
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| error.to_string());
            return self.terminate(StreamEvent::Error(message));
        }

        let mut events = Vec::new();
        let Some(choice) = chunk.choices.into_iter().next() else {
            return events;
        };

        if let Some(text) = choice.delta.content {
            if !text.is_empty() {
                events.push(StreamEvent::Delta(text));
            }
        }

        for delta in choice.delta.tool_calls.unwrap_or_default() {
            let state = self.tool_states.entry(delta.index).or_default();
            if let Some(id) = delta.id {
                state.id = id;
            }
            if let Some(function) = delta.function {
                if let Some(name) = function.name {
                    state.name.push_str(&name);
                }
                if let Some(arguments) = function.arguments {
                    state.arguments_buffer.push_str(&arguments);
                }
            }
        }

        if choice.finish_reason.is_some() {
            events.extend(self.complete());
        }
        events
    }

    /// Release pending tool calls followed by `Completed`.
    fn complete(&mut self) -> Vec<StreamEvent> {
        let mut events: Vec<StreamEvent> = std::mem::take(&mut self.tool_states)
            .into_values()
            .map(|state| StreamEvent::ToolCall(state.into_request()))
            .collect();
        events.push(StreamEvent::Completed);
        self.finished = true;
        events
    }

    fn terminate(&mut self, event: StreamEvent) -> Vec<StreamEvent> {
        self.tool_states.clear();
        self.finished = true;
        vec![event]
    }
}

fn push_normalized(buffer: &mut String, text: &str) {
    buffer.push_str(&text.replace("\r\n", "\n"));
}

/// Join the `data:` lines of one event.
fn extract_data(event_text: &str) -> Option<String> {
    let lines: Vec<&str> = event_text
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|rest| rest.strip_prefix(' ').unwrap_or(rest))
        .collect();
    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data(chunk: Value) -> String {
        format!("data: {}\n\n", chunk)
    }

    fn text_chunk(text: &str) -> String {
        data(json!({"choices": [{"delta": {"content": text}, "finish_reason": null}]}))
    }

    #[test]
    fn test_text_deltas_then_done() {
        let mut decoder = SseDecoder::new();
        let input = format!("{}{}data: [DONE]\n\n", text_chunk("Hel"), text_chunk("lo"));

        let events = decoder.feed(input.as_bytes());
        assert_eq!(
            events,
            vec![
                StreamEvent::Delta("Hel".into()),
                StreamEvent::Delta("lo".into()),
                StreamEvent::Completed,
            ]
        );
        assert!(decoder.is_finished());
        assert!(decoder.finish().is_empty());
    }

    #[test]
    fn test_events_split_across_chunks() {
        let mut decoder = SseDecoder::new();
        let input = text_chunk("héllo");
        let bytes = input.as_bytes();
        // Split inside the two-byte 'é'
        let split = input.find('é').unwrap() + 1;

        assert!(decoder.feed(&bytes[..split]).is_empty());
        assert_eq!(
            decoder.feed(&bytes[split..]),
            vec![StreamEvent::Delta("héllo".into())]
        );
    }

    #[test]
    fn test_tool_call_fragments_are_assembled() {
        let mut decoder = SseDecoder::new();
        let input = [
            data(json!({"choices": [{"delta": {"tool_calls": [
                {"index": 0, "id": "call_1", "type": "function",
                 "function": {"name": "get_forecast_abc", "arguments": ""}}
            ]}}]})),
            data(json!({"choices": [{"delta": {"tool_calls": [
                {"index": 0, "function": {"arguments": "{\"city\":"}}
            ]}}]})),
            data(json!({"choices": [{"delta": {"tool_calls": [
                {"index": 1, "id": "call_2", "function": {"name": "search_xyz", "arguments": "{}"}},
                {"index": 0, "function": {"arguments": "\"Oslo\"}"}}
            ]}}]})),
            data(json!({"choices": [{"delta": {}, "finish_reason": "tool_calls"}]})),
            "data: [DONE]\n\n".to_string(),
        ]
        .concat();

        let events = decoder.feed(input.as_bytes());
        assert_eq!(
            events,
            vec![
                StreamEvent::ToolCall(
                    ToolCallRequest::new("get_forecast_abc", json!("{\"city\":\"Oslo\"}"))
                        .with_id("call_1")
                ),
                StreamEvent::ToolCall(
                    ToolCallRequest::new("search_xyz", json!("{}")).with_id("call_2")
                ),
                StreamEvent::Completed,
            ]
        );
    }

    #[test]
    fn test_error_chunk_terminates() {
        let mut decoder = SseDecoder::new();
        let input = format!(
            "{}{}",
            data(json!({"error": {"message": "rate limited", "code": 429}})),
            text_chunk("ignored")
        );

        assert_eq!(
            decoder.feed(input.as_bytes()),
            vec![StreamEvent::Error("rate limited".into())]
        );
        assert!(decoder.finish().is_empty());
    }

    #[test]
    fn test_comments_and_garbage_are_ignored() {
        let mut decoder = SseDecoder::new();
        let input = format!(": keep-alive\n\ndata: {{not json\n\n{}", text_chunk("ok"));
        assert_eq!(
            decoder.feed(input.as_bytes()),
            vec![StreamEvent::Delta("ok".into())]
        );
    }

    #[test]
    fn test_crlf_and_unterminated_tail() {
        let mut decoder = SseDecoder::new();
        let input = "data: {\"choices\":[{\"delta\":{\"content\":\"a\"}}]}\r\n\r\ndata: {\"choices\":[{\"delta\":{\"content\":\"b\"},\"finish_reason\":\"stop\"}]}";

        assert_eq!(
            decoder.feed(input.as_bytes()),
            vec![StreamEvent::Delta("a".into())]
        );
        assert_eq!(
            decoder.finish(),
            vec![StreamEvent::Delta("b".into()), StreamEvent::Completed]
        );
    }

    #[test]
    fn test_truncated_body_is_an_error() {
        let mut decoder = SseDecoder::new();
        let input = format!(
            "{}data: {{\"choices\":[{{\"delta\":{{\"con",
            text_chunk("The answer is")
        );

        assert_eq!(
            decoder.feed(input.as_bytes()),
            vec![StreamEvent::Delta("The answer is".into())]
        );
        assert_eq!(
            decoder.finish(),
            vec![StreamEvent::Error("model stream ended before completion".into())]
        );
        assert!(decoder.is_finished());
    }

    #[test]
    fn test_truncated_body_drops_pending_tool_calls() {
        let mut decoder = SseDecoder::new();
        let input = data(json!({"choices": [{"delta": {"tool_calls": [
            {"index": 0, "id": "call_1", "function": {"name": "get_forecast_abc", "arguments": "{\"ci"}}
        ]}}]}));

        assert!(decoder.feed(input.as_bytes()).is_empty());
        assert_eq!(
            decoder.finish(),
            vec![StreamEvent::Error("model stream ended before completion".into())]
        );
    }
}
