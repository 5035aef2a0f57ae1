//! Application layer for docent
//!
//! This crate contains the generation use case, port definitions, and
//! application configuration. It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::ExecutionParams;
pub use ports::{
    diagnostics::{ComponentSnapshot, DiagnosticsSink, NoDiagnostics},
    llm_gateway::{GatewayError, LlmGateway, StreamHandle},
    retriever::{NoRetriever, Retriever, RetrieverError},
    tool_loader::{Tool, ToolLoader},
    tool_store::{NoToolStore, ToolStore, ToolStoreError},
};
pub use use_cases::run_generation::{
    Generation, GenerationError, Phase, RunGenerationInput, RunGenerationUseCase,
};
pub use use_cases::tool_invoker::ToolInvoker;
