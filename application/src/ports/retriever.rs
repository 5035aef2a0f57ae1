//! Retriever port
//!
//! Supplies documents that are substituted into the system prompt.

use async_trait::async_trait;
use docent_domain::RetrievedDocument;
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RetrieverError {
    #[error("Retriever source unavailable: {0}")]
    Unavailable(String),

    #[error("Search failed: {0}")]
    SearchFailed(String),
}

#[async_trait]
pub trait Retriever: Send + Sync {
    /// Documents relevant to `query`, most relevant first.
    async fn search(&self, query: &str) -> Result<Vec<RetrievedDocument>, RetrieverError>;

    /// Observable state for diagnostics.
    fn snapshot(&self) -> Value {
        Value::Null
    }
}

/// Retriever that never returns documents.
pub struct NoRetriever;

#[async_trait]
impl Retriever for NoRetriever {
    async fn search(&self, _query: &str) -> Result<Vec<RetrievedDocument>, RetrieverError> {
        Ok(Vec::new())
    }
}
