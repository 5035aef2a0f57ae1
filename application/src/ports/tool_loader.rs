//! Tool backend port
//!
//! A [`ToolLoader`] turns a tool kind plus configuration into an executable
//! [`Tool`]. Adapters live in the infrastructure layer.

use async_trait::async_trait;
use docent_domain::{ToolError, ToolOutput};
use serde_json::{Map, Value};

/// A loaded tool backend
#[async_trait]
pub trait Tool: Send + Sync {
    /// Execute one action with call-time arguments.
    async fn execute(
        &self,
        action_name: &str,
        arguments: &Map<String, Value>,
    ) -> Result<ToolOutput, ToolError>;
}

/// Loads tool backends by kind
pub trait ToolLoader: Send + Sync {
    /// Load the backend for `kind` configured with `config`.
    ///
    /// Unknown kinds fail with a `NOT_FOUND` [`ToolError`].
    fn load(&self, kind: &str, config: &Value) -> Result<Box<dyn Tool>, ToolError>;
}
