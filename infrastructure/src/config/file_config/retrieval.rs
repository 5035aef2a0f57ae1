//! Retrieval configuration from TOML (`[retrieval]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw retrieval configuration from TOML
///
/// `documents_path` may point at a directory of `.md`/`.txt` files or at a
/// JSON array of `{text, metadata}` documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRetrievalConfig {
    pub documents_path: Option<PathBuf>,
    /// Maximum documents substituted into the prompt
    pub top_k: usize,
}

impl Default for FileRetrievalConfig {
    fn default() -> Self {
        Self {
            documents_path: None,
            top_k: 3,
        }
    }
}
