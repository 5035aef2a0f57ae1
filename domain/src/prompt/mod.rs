//! Prompt domain
//!
//! The conversation builder and the built-in system prompt.

mod conversation;
mod template;

pub use conversation::{ConversationBuilder, SUMMARIES_PLACEHOLDER};
pub use template::PromptTemplate;
