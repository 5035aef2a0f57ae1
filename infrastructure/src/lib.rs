//! Infrastructure layer for docent
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: the model gateway, tool store, tool
//! backends, retriever, diagnostics sink, and configuration loading.

pub mod config;
pub mod history;
pub mod logging;
pub mod providers;
pub mod retrieval;
pub mod store;
pub mod tools;

// Re-export commonly used types
pub use config::{
    ConfigLoader, FileAgentConfig, FileConfig, FileLoggingConfig, FileModelConfig,
    FileOutputConfig, FileRetrievalConfig, FileToolsConfig,
};
pub use history::{HistoryError, HistoryStore};
pub use logging::JsonlDiagnosticsSink;
pub use providers::{OpenAiCompatibleGateway, ProviderSettings, create_gateway};
pub use retrieval::FileKeywordRetriever;
pub use store::JsonFileToolStore;
pub use tools::{ApiTool, ToolManager};
