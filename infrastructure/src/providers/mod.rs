//! Model provider adapters
//!
//! [`create_gateway`] builds the [`LlmGateway`] for the configured vendor.
//! Vendors that speak the OpenAI chat-completions protocol share
//! [`OpenAiCompatibleGateway`]; other vendors are not wired yet and are
//! rejected as unavailable.

pub mod openai;

pub use openai::{OpenAiCompatibleGateway, SseDecoder};

use docent_application::ports::llm_gateway::{GatewayError, LlmGateway};
use docent_domain::ProviderKind;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Connection settings for one provider
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderSettings {
    pub provider: ProviderKind,
    /// Overrides the provider's default endpoint
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    /// Connect timeout; streamed responses are not time-limited
    pub connect_timeout: Option<Duration>,
}

impl ProviderSettings {
    pub fn new(provider: ProviderKind) -> Self {
        Self {
            provider,
            ..Self::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Configured endpoint, falling back to the provider default
    pub fn resolved_base_url(&self) -> Option<&str> {
        self.base_url
            .as_deref()
            .or_else(|| self.provider.default_base_url())
    }
}

/// Build the gateway for the configured provider.
pub fn create_gateway(settings: &ProviderSettings) -> Result<Arc<dyn LlmGateway>, GatewayError> {
    let provider = settings.provider;
    if !provider.is_openai_compatible() {
        return Err(GatewayError::ModelNotAvailable(format!(
            "provider '{}' is not supported by this build",
            provider
        )));
    }

    let base_url = settings.resolved_base_url().ok_or_else(|| {
        GatewayError::ModelNotAvailable(format!(
            "provider '{}' requires model.base_url to be set",
            provider
        ))
    })?;

    let mut builder = reqwest::Client::builder()
        .user_agent(concat!("docent/", env!("CARGO_PKG_VERSION")));
    if let Some(timeout) = settings.connect_timeout {
        builder = builder.connect_timeout(timeout);
    }
    let client = builder
        .build()
        .map_err(|e| GatewayError::Other(format!("Failed to build HTTP client: {}", e)))?;

    debug!("Using {} gateway at {}", provider, base_url);
    Ok(Arc::new(OpenAiCompatibleGateway::new(
        provider,
        base_url,
        settings.api_key.clone(),
        client,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openai_uses_default_endpoint() {
        let gateway = create_gateway(&ProviderSettings::new(ProviderKind::OpenAi)).unwrap();
        assert_eq!(gateway.provider(), ProviderKind::OpenAi);
        assert_eq!(gateway.snapshot()["base_url"], "https://api.openai.com/v1");
    }

    #[test]
    fn test_base_url_override() {
        let settings =
            ProviderSettings::new(ProviderKind::LlamaCpp).with_base_url("http://gpu-box:8080/v1");
        let gateway = create_gateway(&settings).unwrap();
        assert_eq!(gateway.snapshot()["base_url"], "http://gpu-box:8080/v1");
    }

    #[test]
    fn test_compatible_provider_without_endpoint() {
        let err = create_gateway(&ProviderSettings::new(ProviderKind::AzureOpenAi))
            .err()
            .unwrap();
        assert!(matches!(err, GatewayError::ModelNotAvailable(msg) if msg.contains("base_url")));
    }

    #[test]
    fn test_unsupported_provider() {
        for provider in [
            ProviderKind::Anthropic,
            ProviderKind::Google,
            ProviderKind::Sagemaker,
            ProviderKind::HuggingFace,
        ] {
            let err = create_gateway(&ProviderSettings::new(provider)).err().unwrap();
            assert!(matches!(err, GatewayError::ModelNotAvailable(_)));
        }
    }
}
