//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for generation events
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Streamed answer with tool calls and sources
    Text,
    /// One JSON object per event
    Json,
}

impl From<OutputFormat> for docent_domain::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => docent_domain::OutputFormat::Text,
            OutputFormat::Json => docent_domain::OutputFormat::Json,
        }
    }
}

/// CLI arguments for docent
#[derive(Parser, Debug)]
#[command(name = "docent")]
#[command(author, version, about = "Answer questions with retrieved documents and tools")]
#[command(long_about = r#"
Docent answers a question with a language model. Relevant local documents
are placed in the system prompt, and the model may call the HTTP tools
enabled for the user; results are fed back until it answers.

Configuration files are loaded from (in priority order):
1. DOCENT_* environment variables (e.g. DOCENT_MODEL__NAME)
2. --config <path>     Explicit config file
3. ./docent.toml       Project-level config
4. ~/.config/docent/config.toml   Global config

Example:
  docent "What does the deploy guide say about rollbacks?"
  docent --history chat.json --save-history "And for the staging cluster?"
  docent -o json "What's the weather in Oslo?"
"#)]
pub struct Cli {
    /// The question to answer
    pub query: Option<String>,

    /// Conversation history file (JSON array of turns)
    #[arg(long, value_name = "PATH")]
    pub history: Option<PathBuf>,

    /// Append this exchange to the history file
    #[arg(long, requires = "history")]
    pub save_history: bool,

    /// User whose enabled tools are offered to the model
    #[arg(short, long, value_name = "USER")]
    pub user: Option<String>,

    /// Model name (overrides the configured model)
    #[arg(short, long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Output format (overrides the configured format)
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and the effective configuration, then exit
    #[arg(long)]
    pub show_config: bool,
}
