//! Presentation layer for docent
//!
//! This crate contains CLI definitions, event formatters, and the
//! renderer that streams a generation to the terminal.

pub mod cli;
pub mod output;

// Re-export commonly used types
pub use cli::commands::{Cli, OutputFormat};
pub use output::console::ConsoleFormatter;
pub use output::formatter::{EventFormatter, JsonLinesFormatter};
pub use output::render::{GenerationOutcome, RenderError, render_events};
pub use output::set_color_enabled;
