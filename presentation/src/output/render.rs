//! Drive a generation's event stream to an output sink.

use super::formatter::EventFormatter;
use docent_application::GenerationError;
use docent_domain::{ConversationTurn, GenerationEvent, RetrievedDocument, ToolCallRecord};
use futures::{Stream, StreamExt, pin_mut};
use std::io::Write;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),
}

/// What a finished generation produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationOutcome {
    pub answer: String,
    pub tool_calls: Vec<ToolCallRecord>,
    pub sources: Vec<RetrievedDocument>,
    /// Set when the generation stopped at the tool round bound
    pub round_limit: Option<usize>,
}

impl GenerationOutcome {
    fn absorb(&mut self, event: &GenerationEvent) {
        match event {
            GenerationEvent::Answer(chunk) => self.answer.push_str(chunk),
            GenerationEvent::ToolCall(record) => self.tool_calls.push(record.clone()),
            GenerationEvent::RoundLimitReached { limit } => self.round_limit = Some(*limit),
            GenerationEvent::Sources(documents) => self.sources = documents.clone(),
            GenerationEvent::ToolCalls(records) => self.tool_calls = records.clone(),
        }
    }

    /// History entry for this exchange
    pub fn into_turn(self, prompt: impl Into<String>) -> ConversationTurn {
        ConversationTurn::exchange(prompt, self.answer).with_tool_calls(self.tool_calls)
    }
}

/// Write every event as it arrives, flushing after each one.
///
/// Stops at the first generation error; everything rendered up to that
/// point has already been written.
pub async fn render_events<S, W>(
    events: S,
    formatter: &mut dyn EventFormatter,
    out: &mut W,
) -> Result<GenerationOutcome, RenderError>
where
    S: Stream<Item = Result<GenerationEvent, GenerationError>>,
    W: Write,
{
    pin_mut!(events);
    let mut outcome = GenerationOutcome::default();

    while let Some(item) = events.next().await {
        let event = match item {
            Ok(event) => event,
            Err(e) => {
                write!(out, "{}", formatter.finish())?;
                out.flush()?;
                return Err(e.into());
            }
        };
        outcome.absorb(&event);
        let text = formatter.format_event(&event);
        if !text.is_empty() {
            write!(out, "{}", text)?;
            out.flush()?;
        }
    }

    write!(out, "{}", formatter.finish())?;
    out.flush()?;
    Ok(outcome)
}
