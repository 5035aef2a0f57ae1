//! Tool manager
//!
//! The [`ToolManager`] maps tool kinds (the stored tool's `name`) to
//! backend factories and implements the [`ToolLoader`] port.
//!
//! # Usage
//!
//! ```ignore
//! use docent_infrastructure::tools::ToolManager;
//!
//! let manager = ToolManager::with_timeout(Duration::from_secs(30))?
//!     .register("echo", |config| Ok(Box::new(EchoTool::new(config)) as Box<dyn Tool>));
//!
//! let tool = manager.load("api_tool", &config)?;
//! let output = tool.execute("get_forecast", &arguments).await?;
//! ```

use super::api::{ApiTool, ApiToolConfig};
use docent_application::ports::tool_loader::{Tool, ToolLoader};
use docent_domain::{API_TOOL, ToolError};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Builds a backend from its configuration
pub type ToolFactory = Arc<dyn Fn(&Value) -> Result<Box<dyn Tool>, ToolError> + Send + Sync>;

/// Loads tool backends by kind
pub struct ToolManager {
    factories: HashMap<String, ToolFactory>,
}

impl ToolManager {
    /// Create a manager with the built-in `api_tool` backend.
    pub fn new(client: reqwest::Client) -> Self {
        let manager = Self {
            factories: HashMap::new(),
        };
        manager.register(API_TOOL, move |config| {
            let config = ApiToolConfig::from_value(config)?;
            Ok(Box::new(ApiTool::new(client.clone(), config)) as Box<dyn Tool>)
        })
    }

    /// Create a manager whose HTTP client times out after `timeout`.
    pub fn with_timeout(timeout: Duration) -> Result<Self, ToolError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("docent/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                ToolError::execution_failed(format!("Failed to build HTTP client: {}", e))
            })?;
        Ok(Self::new(client))
    }

    /// Register (or replace) the backend for `kind`.
    pub fn register<F>(mut self, kind: impl Into<String>, factory: F) -> Self
    where
        F: Fn(&Value) -> Result<Box<dyn Tool>, ToolError> + Send + Sync + 'static,
    {
        self.factories.insert(kind.into(), Arc::new(factory));
        self
    }
}

impl ToolLoader for ToolManager {
    fn load(&self, kind: &str, config: &Value) -> Result<Box<dyn Tool>, ToolError> {
        let factory = self
            .factories
            .get(kind)
            .ok_or_else(|| ToolError::not_found(format!("tool kind '{}'", kind)))?;
        factory(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use docent_domain::ToolOutput;
    use serde_json::{Map, json};

    struct EchoTool {
        prefix: String,
    }

    #[async_trait]
    impl Tool for EchoTool {
        async fn execute(
            &self,
            action_name: &str,
            arguments: &Map<String, Value>,
        ) -> Result<ToolOutput, ToolError> {
            Ok(ToolOutput::Text(format!(
                "{}{}:{}",
                self.prefix,
                action_name,
                Value::Object(arguments.clone())
            )))
        }
    }

    fn manager() -> ToolManager {
        ToolManager::new(reqwest::Client::new()).register("echo", |config| {
            let prefix = config
                .get("prefix")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            Ok(Box::new(EchoTool { prefix }) as Box<dyn Tool>)
        })
    }

    #[test]
    fn test_builtin_and_registered_kinds_load() {
        let manager = manager();
        assert!(
            manager
                .load("api_tool", &json!({"url": "https://api.example.com"}))
                .is_ok()
        );
        assert!(manager.load("echo", &json!({})).is_ok());
    }

    #[test]
    fn test_unknown_kind_is_not_found() {
        let err = manager().load("brave", &json!({})).err().unwrap();
        assert_eq!(err.code, "NOT_FOUND");
        assert!(err.message.contains("brave"));
    }

    #[test]
    fn test_api_tool_config_errors_surface_on_load() {
        let err = manager().load("api_tool", &json!({})).err().unwrap();
        assert_eq!(err.code, "INVALID_ARGUMENT");
    }

    #[tokio::test]
    async fn test_custom_backend_receives_config_and_arguments() {
        let tool = manager().load("echo", &json!({"prefix": ">"})).unwrap();
        let mut args = Map::new();
        args.insert("q".to_string(), json!("rust"));

        let output = tool.execute("search", &args).await.unwrap();
        assert_eq!(output, ToolOutput::Text(r#">search:{"q":"rust"}"#.to_string()));
    }
}
