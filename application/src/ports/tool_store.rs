//! Tool store port
//!
//! Read-only access to the tools a user has enabled.

use async_trait::async_trait;
use docent_domain::ToolSet;
use thiserror::Error;

/// Errors raised by tool store adapters
#[derive(Error, Debug)]
pub enum ToolStoreError {
    #[error("Tool store unavailable: {0}")]
    Unavailable(String),

    #[error("Malformed tool document: {0}")]
    Malformed(String),
}

/// Source of tool definitions.
///
/// Invocations never write to the store, so implementations need no
/// locking beyond what their backend requires.
#[async_trait]
pub trait ToolStore: Send + Sync {
    /// Tools marked enabled for `user`, keyed by tool id.
    async fn list_active_tools(&self, user: &str) -> Result<ToolSet, ToolStoreError>;
}

/// Store with no tools; generations run as plain chat.
pub struct NoToolStore;

#[async_trait]
impl ToolStore for NoToolStore {
    async fn list_active_tools(&self, _user: &str) -> Result<ToolSet, ToolStoreError> {
        Ok(ToolSet::new())
    }
}
