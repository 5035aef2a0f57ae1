//! Console output formatter for generation events

use crate::output::formatter::EventFormatter;
use colored::Colorize;
use docent_domain::util::preview;
use docent_domain::{GenerationEvent, RetrievedDocument, ToolCallRecord};
use serde_json::Value;

const RESULT_PREVIEW_BYTES: usize = 120;

/// Streams the answer as it arrives, with tool calls and sources on
/// their own lines
#[derive(Debug)]
pub struct ConsoleFormatter {
    at_line_start: bool,
}

impl Default for ConsoleFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleFormatter {
    pub fn new() -> Self {
        Self {
            at_line_start: true,
        }
    }

    /// Newline needed before a block that must start on its own line
    fn break_line(&mut self) -> &'static str {
        if self.at_line_start {
            ""
        } else {
            self.at_line_start = true;
            "\n"
        }
    }

    fn tool_call(record: &ToolCallRecord) -> String {
        let arguments = Value::Object(record.arguments.clone()).to_string();
        let head = format!(
            "{} {}{}",
            "tool".cyan().bold(),
            record.action_name.bold(),
            format!("({})", preview(&arguments, RESULT_PREVIEW_BYTES)).dimmed()
        );

        if record.is_error() {
            let message = record.result["error"]
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| record.result["error"].to_string());
            format!("{} {} {}\n", head, "failed:".red().bold(), message.red())
        } else {
            let result = record.result.to_string();
            format!("{} -> {}\n", head, preview(&result, RESULT_PREVIEW_BYTES).dimmed())
        }
    }

    fn sources(documents: &[RetrievedDocument]) -> String {
        let mut output = format!("\n{}\n", "Sources:".cyan().bold());
        for (index, doc) in documents.iter().enumerate() {
            let label = doc
                .title()
                .map(str::to_string)
                .unwrap_or_else(|| preview(doc.text.trim(), 60).into_owned());
            match doc.source() {
                Some(source) => output.push_str(&format!(
                    "  [{}] {} {}\n",
                    index + 1,
                    label,
                    format!("({})", source).dimmed()
                )),
                None => output.push_str(&format!("  [{}] {}\n", index + 1, label)),
            }
        }
        output
    }
}

impl EventFormatter for ConsoleFormatter {
    fn format_event(&mut self, event: &GenerationEvent) -> String {
        match event {
            GenerationEvent::Answer(chunk) => {
                if !chunk.is_empty() {
                    self.at_line_start = chunk.ends_with('\n');
                }
                chunk.clone()
            }
            GenerationEvent::ToolCall(record) => {
                format!("{}{}", self.break_line(), Self::tool_call(record))
            }
            GenerationEvent::RoundLimitReached { limit } => format!(
                "{}{}\n",
                self.break_line(),
                format!("Stopped after {} tool rounds without a final answer", limit)
                    .yellow()
                    .bold()
            ),
            GenerationEvent::Sources(documents) if !documents.is_empty() => {
                format!("{}{}", self.break_line(), Self::sources(documents))
            }
            // Calls were already shown as they ran
            GenerationEvent::Sources(_) | GenerationEvent::ToolCalls(_) => String::new(),
        }
    }

    fn finish(&mut self) -> String {
        self.break_line().to_string()
    }
}
