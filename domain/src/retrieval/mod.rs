//! Retrieved documents

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A document returned by the retriever
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedDocument {
    pub text: String,
    /// Free-form metadata (title, source, ...)
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub metadata: Value,
}

impl RetrievedDocument {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            metadata: Value::Null,
        }
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = metadata;
        self
    }

    /// Title from metadata, if any
    pub fn title(&self) -> Option<&str> {
        self.metadata.get("title").and_then(Value::as_str)
    }

    /// Source location from metadata, if any
    pub fn source(&self) -> Option<&str> {
        self.metadata.get("source").and_then(Value::as_str)
    }
}
