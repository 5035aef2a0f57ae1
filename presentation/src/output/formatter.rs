//! Output formatter trait

use docent_domain::GenerationEvent;
use serde_json::json;

/// Turns generation events into output text, one event at a time
pub trait EventFormatter {
    /// Text to write for `event` (may be empty)
    fn format_event(&mut self, event: &GenerationEvent) -> String;

    /// Text to write once the generation has ended
    fn finish(&mut self) -> String {
        String::new()
    }
}

/// One JSON object per line: `{"type": "...", "data": ...}`
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonLinesFormatter;

impl EventFormatter for JsonLinesFormatter {
    fn format_event(&mut self, event: &GenerationEvent) -> String {
        let line = serde_json::to_string(event).unwrap_or_else(|e| {
            json!({"type": "error", "data": format!("unserializable event: {}", e)}).to_string()
        });
        format!("{}\n", line)
    }
}
