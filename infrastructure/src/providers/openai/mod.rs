//! OpenAI-compatible chat-completions adapter

mod gateway;
mod sse;

pub use gateway::OpenAiCompatibleGateway;
pub use sse::SseDecoder;
