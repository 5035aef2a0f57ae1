//! Agent configuration from TOML (`[agent]` section)

use docent_domain::{ConfigIssue, ConfigIssueCode, PromptTemplate, SUMMARIES_PLACEHOLDER};
use serde::{Deserialize, Serialize};

/// Raw agent configuration from TOML
///
/// # Example
///
/// ```toml
/// [agent]
/// system_prompt = "Answer from these notes:\n{summaries}"
/// max_tool_rounds = 5
/// user = "alice"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAgentConfig {
    /// System prompt; `{summaries}` receives retrieved documents
    pub system_prompt: Option<String>,
    /// Maximum tool-call rounds per generation
    pub max_tool_rounds: usize,
    /// User whose enabled tools are loaded
    pub user: String,
}

impl Default for FileAgentConfig {
    fn default() -> Self {
        Self {
            system_prompt: None,
            max_tool_rounds: 10,
            user: "local".to_string(),
        }
    }
}

impl FileAgentConfig {
    /// Configured system prompt or the built-in one.
    pub fn system_prompt(&self) -> &str {
        self.system_prompt
            .as_deref()
            .unwrap_or(PromptTemplate::default_system())
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if self.max_tool_rounds == 0 {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::ZeroToolRounds,
                "agent.max_tool_rounds",
                "is 0: every tool request will stop the generation",
            ));
        }
        if let Some(prompt) = &self.system_prompt
            && !prompt.contains(SUMMARIES_PLACEHOLDER)
        {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::MissingSummariesPlaceholder,
                "agent.system_prompt",
                format!(
                    "has no {} placeholder: retrieved documents will not reach the model",
                    SUMMARIES_PLACEHOLDER
                ),
            ));
        }
        issues
    }
}
