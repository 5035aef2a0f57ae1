//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod agent;
mod logging;
mod models;
mod output;
mod retrieval;
mod tools;

pub use agent::FileAgentConfig;
pub use logging::FileLoggingConfig;
pub use models::FileModelConfig;
pub use output::FileOutputConfig;
pub use retrieval::FileRetrievalConfig;
pub use tools::FileToolsConfig;

use docent_application::ExecutionParams;
use docent_domain::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Model vendor and name
    pub model: FileModelConfig,
    /// Generation loop settings
    pub agent: FileAgentConfig,
    /// Tool store settings
    pub tools: FileToolsConfig,
    /// Document retrieval settings
    pub retrieval: FileRetrievalConfig,
    /// Diagnostics output
    pub logging: FileLoggingConfig,
    /// Output settings
    pub output: FileOutputConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        issues.extend(self.model.parse_provider().1);
        if self.model.name.trim().is_empty() {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::EmptyModelName,
                "model.name",
                "must not be empty",
            ));
        }

        issues.extend(self.agent.validate());

        issues
    }

    /// Loop control parameters for the generation use case.
    pub fn execution_params(&self) -> ExecutionParams {
        ExecutionParams::default()
            .with_model(self.model.name.clone())
            .with_max_tool_rounds(self.agent.max_tool_rounds)
    }

    /// Render the effective configuration as TOML (for `--show-config`).
    ///
    /// The API key is masked.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        let mut shown = self.clone();
        if shown.model.api_key.is_some() {
            shown.model.api_key = Some("********".to_string());
        }
        toml::to_string_pretty(&shown)
    }
}
