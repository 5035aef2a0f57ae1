//! Conversation domain.
//!
//! - [`entities::Message`]: a single message sent to the model
//! - [`history::ConversationTurn`]: a stored history entry
//! - [`stream::StreamEvent`]: an event in a streaming model response

pub mod entities;
pub mod history;
pub mod stream;
