//! Model configuration from TOML (`[model]` section)

use docent_domain::{ConfigIssue, ConfigIssueCode, ProviderKind};
use serde::{Deserialize, Serialize};

/// Raw model configuration from TOML
///
/// # Example
///
/// ```toml
/// [model]
/// provider = "groq"                # any provider name, case-insensitive
/// name = "llama-3.1-70b-versatile"
/// api_key_env = "GROQ_API_KEY"     # optional, defaults per provider
/// base_url = "http://localhost:8080/v1"  # optional override
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileModelConfig {
    pub provider: String,
    pub name: String,
    /// Direct API key (prefer `api_key_env`).
    pub api_key: Option<String>,
    /// Environment variable holding the API key.
    pub api_key_env: Option<String>,
    /// Endpoint override for OpenAI-compatible providers.
    pub base_url: Option<String>,
}

impl Default for FileModelConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default().as_str().to_string(),
            name: docent_application::config::execution_params::DEFAULT_MODEL.to_string(),
            api_key: None,
            api_key_env: None,
            base_url: None,
        }
    }
}

impl FileModelConfig {
    /// Parse the provider name, falling back to OpenAI with an error issue.
    pub fn parse_provider(&self) -> (ProviderKind, Vec<ConfigIssue>) {
        match self.provider.parse::<ProviderKind>() {
            Ok(kind) => (kind, vec![]),
            Err(e) => {
                let valid = ProviderKind::ALL
                    .iter()
                    .map(|p| p.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                let issue = ConfigIssue::error(
                    ConfigIssueCode::UnknownProvider,
                    "model.provider",
                    format!("{} (valid: {})", e, valid),
                );
                (ProviderKind::default(), vec![issue])
            }
        }
    }

    /// Environment variable consulted for the API key.
    pub fn api_key_env_name(&self, provider: ProviderKind) -> String {
        self.api_key_env
            .clone()
            .unwrap_or_else(|| default_api_key_env(provider).to_string())
    }

    /// API key from the config file, or from the environment.
    pub fn resolve_api_key(&self, provider: ProviderKind) -> Option<String> {
        self.api_key.clone().or_else(|| {
            std::env::var(self.api_key_env_name(provider))
                .ok()
                .filter(|key| !key.is_empty())
        })
    }
}

fn default_api_key_env(provider: ProviderKind) -> &'static str {
    match provider {
        ProviderKind::OpenAi => "OPENAI_API_KEY",
        ProviderKind::AzureOpenAi => "AZURE_OPENAI_API_KEY",
        ProviderKind::Sagemaker => "SAGEMAKER_API_KEY",
        ProviderKind::HuggingFace => "HUGGINGFACE_API_KEY",
        ProviderKind::LlamaCpp => "LLAMA_CPP_API_KEY",
        ProviderKind::Anthropic => "ANTHROPIC_API_KEY",
        ProviderKind::Docsgpt => "DOCSGPT_API_KEY",
        ProviderKind::PremAi => "PREMAI_API_KEY",
        ProviderKind::Groq => "GROQ_API_KEY",
        ProviderKind::Google => "GOOGLE_API_KEY",
        ProviderKind::Novita => "NOVITA_API_KEY",
    }
}
