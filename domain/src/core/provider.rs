//! Model provider value object

use super::error::DomainError;

/// Model vendors the generation loop can be configured with (Value Object)
///
/// The provider decides two things: which adapter streams the model
/// response, and how the model encodes function calls (see
/// [`ToolCallParser::for_provider`](crate::tool::call::ToolCallParser::for_provider)).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProviderKind {
    #[default]
    OpenAi,
    AzureOpenAi,
    Sagemaker,
    HuggingFace,
    LlamaCpp,
    Anthropic,
    Docsgpt,
    PremAi,
    Groq,
    Google,
    Novita,
}

impl ProviderKind {
    /// All known providers, in configuration-documentation order
    pub const ALL: [ProviderKind; 11] = [
        ProviderKind::OpenAi,
        ProviderKind::AzureOpenAi,
        ProviderKind::Sagemaker,
        ProviderKind::HuggingFace,
        ProviderKind::LlamaCpp,
        ProviderKind::Anthropic,
        ProviderKind::Docsgpt,
        ProviderKind::PremAi,
        ProviderKind::Groq,
        ProviderKind::Google,
        ProviderKind::Novita,
    ];

    /// Get the configuration identifier for this provider
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::AzureOpenAi => "azure_openai",
            ProviderKind::Sagemaker => "sagemaker",
            ProviderKind::HuggingFace => "huggingface",
            ProviderKind::LlamaCpp => "llama.cpp",
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::Docsgpt => "docsgpt",
            ProviderKind::PremAi => "premai",
            ProviderKind::Groq => "groq",
            ProviderKind::Google => "google",
            ProviderKind::Novita => "novita",
        }
    }

    /// Whether the provider speaks the OpenAI chat-completions wire format
    pub fn is_openai_compatible(&self) -> bool {
        matches!(
            self,
            ProviderKind::OpenAi
                | ProviderKind::AzureOpenAi
                | ProviderKind::LlamaCpp
                | ProviderKind::Docsgpt
                | ProviderKind::PremAi
                | ProviderKind::Groq
                | ProviderKind::Novita
        )
    }

    /// Default API base URL for OpenAI-compatible providers
    pub fn default_base_url(&self) -> Option<&'static str> {
        match self {
            ProviderKind::OpenAi => Some("https://api.openai.com/v1"),
            ProviderKind::Groq => Some("https://api.groq.com/openai/v1"),
            ProviderKind::Novita => Some("https://api.novita.ai/v3/openai"),
            ProviderKind::LlamaCpp => Some("http://localhost:8080/v1"),
            _ => None,
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = DomainError;

    /// Case-insensitive lookup by configuration identifier
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        ProviderKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == lowered)
            .ok_or_else(|| DomainError::UnknownProvider(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_providers() {
        for kind in ProviderKind::ALL {
            assert_eq!(kind.as_str().parse::<ProviderKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("OpenAI".parse::<ProviderKind>().unwrap(), ProviderKind::OpenAi);
        assert_eq!(
            "Llama.CPP".parse::<ProviderKind>().unwrap(),
            ProviderKind::LlamaCpp
        );
    }

    #[test]
    fn test_parse_unknown_provider() {
        let err = "bard".parse::<ProviderKind>().unwrap_err();
        assert_eq!(err, DomainError::UnknownProvider("bard".to_string()));
    }

    #[test]
    fn test_openai_compatibility() {
        assert!(ProviderKind::Groq.is_openai_compatible());
        assert!(!ProviderKind::Google.is_openai_compatible());
        assert!(!ProviderKind::Anthropic.is_openai_compatible());
        assert_eq!(
            ProviderKind::OpenAi.default_base_url(),
            Some("https://api.openai.com/v1")
        );
        assert_eq!(ProviderKind::AzureOpenAi.default_base_url(), None);
    }
}
