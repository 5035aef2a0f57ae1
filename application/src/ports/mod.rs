//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod diagnostics;
pub mod llm_gateway;
pub mod retriever;
pub mod tool_loader;
pub mod tool_store;
