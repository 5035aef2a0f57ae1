//! Built-in system prompt

/// Built-in prompt used when no system prompt is configured
pub struct PromptTemplate;

impl PromptTemplate {
    /// Default system prompt; `{summaries}` receives the retrieved documents
    pub fn default_system() -> &'static str {
        r#"You are a helpful assistant that answers questions using the provided sources and tools.
Call a tool when it can supply information you do not have. Prefer the sources below when they are relevant,
and say so plainly when neither the sources nor the tools contain the answer.

----------------
{summaries}"#
    }
}
