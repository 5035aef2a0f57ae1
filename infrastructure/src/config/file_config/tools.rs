//! Tools configuration from TOML (`[tools]` section)
//!
//! ```toml
//! [tools]
//! store_path = "~/.config/docent/tools.json"
//! timeout_secs = 30
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw tools configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileToolsConfig {
    /// JSON file of stored tool documents; no tools when unset
    pub store_path: Option<PathBuf>,
    /// Timeout for HTTP tool calls
    pub timeout_secs: u64,
}

impl Default for FileToolsConfig {
    fn default() -> Self {
        Self {
            store_path: None,
            timeout_secs: 30,
        }
    }
}
