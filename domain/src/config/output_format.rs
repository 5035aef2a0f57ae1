//! Output format value object

use serde::{Deserialize, Serialize};

/// How generation events are rendered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Streamed, colored console output (default)
    #[default]
    Text,
    /// One JSON object per event
    Json,
}
