//! Output configuration from TOML (`[output]` section)
//!
//! ```toml
//! [output]
//! format = "json"   # or "text"
//! color = false
//! ```

use docent_domain::OutputFormat;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOutputConfig {
    /// Event rendering; unset means text
    pub format: Option<OutputFormat>,
    pub color: bool,
}

impl Default for FileOutputConfig {
    fn default() -> Self {
        Self {
            format: None,
            color: true,
        }
    }
}

impl FileOutputConfig {
    /// The format to render with, given an optional command-line choice.
    pub fn resolve_format(&self, requested: Option<OutputFormat>) -> OutputFormat {
        requested.or(self.format).unwrap_or_default()
    }

    /// Whether colors stay on, given the `--no-color` flag.
    pub fn color_enabled(&self, no_color_flag: bool) -> bool {
        self.color && !no_color_flag
    }
}
