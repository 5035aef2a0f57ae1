//! Conversation builder: turns a system prompt, retrieved documents and
//! stored history into the message sequence sent to the model.
//!
//! ```text
//! system(prompt with {summaries} replaced)
//! for each history turn:
//!     user(prompt), assistant(response)          if both are present
//!     assistant(function_call), tool(response)   for each stored record
//! user(query)
//! assistant(function_call), tool(response)       for records of this generation
//! ```

use crate::retrieval::RetrievedDocument;
use crate::session::entities::Message;
use crate::session::history::ConversationTurn;
use crate::tool::record::ToolCallRecord;

/// Placeholder in the system prompt replaced by retrieved document text
pub const SUMMARIES_PLACEHOLDER: &str = "{summaries}";

/// Builds model transcripts from immutable inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationBuilder {
    system_prompt: String,
}

impl ConversationBuilder {
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
        }
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// The system message with retrieved texts joined by newlines
    pub fn system_message(&self, retrieved: &[RetrievedDocument]) -> Message {
        let docs_together = retrieved
            .iter()
            .map(|doc| doc.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        Message::system(
            self.system_prompt
                .replace(SUMMARIES_PLACEHOLDER, &docs_together),
        )
    }

    /// Build the full transcript for the first model turn.
    ///
    /// Produces `1 + 2*pairs + 2*records + 1` messages. Stored records
    /// without a call id get `call_{turn}_{index}`, so identical input
    /// always yields an identical transcript.
    pub fn build(
        &self,
        query: &str,
        retrieved: &[RetrievedDocument],
        history: &[ConversationTurn],
    ) -> Vec<Message> {
        let mut messages = vec![self.system_message(retrieved)];

        for (turn_index, turn) in history.iter().enumerate() {
            if let Some((prompt, response)) = turn.pair() {
                messages.push(Message::user(prompt));
                messages.push(Message::assistant(response));
            }
            for (record_index, record) in turn.tool_calls.iter().enumerate() {
                let call_id = record
                    .call_id
                    .clone()
                    .unwrap_or_else(|| format!("call_{turn_index}_{record_index}"));
                push_exchange(&mut messages, record, call_id);
            }
        }

        messages.push(Message::user(query));
        messages
    }

    /// Append the call/response pair of a record produced in this generation.
    ///
    /// The driver always assigns a call id before recording, so a missing
    /// id here only happens for hand-built records.
    pub fn append_tool_exchange(messages: &mut Vec<Message>, record: &ToolCallRecord) {
        let call_id = record
            .call_id
            .clone()
            .unwrap_or_else(|| format!("call_pending_{}", messages.len()));
        push_exchange(messages, record, call_id);
    }
}

fn push_exchange(messages: &mut Vec<Message>, record: &ToolCallRecord, call_id: String) {
    messages.push(Message::function_call(
        record.action_name.clone(),
        record.arguments.clone(),
        call_id.clone(),
    ));
    messages.push(Message::function_response(
        record.action_name.clone(),
        record.result.clone(),
        call_id,
    ));
}
