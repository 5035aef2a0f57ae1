//! Tool domain module
//!
//! This module defines how externally configured tools are described,
//! exposed to the model, and turned into concrete invocations.
//!
//! # Overview
//!
//! ```text
//! ┌────────────────┐   exposed_schemas()   ┌───────────────────┐
//! │ ToolSet        │──────────────────────▶│ ExposedToolSchema │──▶ model
//! │ (id → ToolDef) │                       └───────────────────┘
//! └──────┬─────────┘
//!        │  ToolCallRequest from model
//!        ▼
//! ToolCallParser::parse ─▶ bind_parameters ─▶ ToolInvocation::prepare ─▶ backend
//!                                                                  │
//!                                      ToolCallRecord ◀── ToolOutput / ToolError
//! ```
//!
//! # Key Types
//!
//! - [`ToolDefinition`] / [`ToolAction`]: stored tool with parameter groups
//! - [`ExposedToolSchema`]: model-facing function signature
//! - [`ToolCallParser`]: vendor-specific call resolution
//! - [`BoundParameters`]: static values merged with model arguments
//! - [`ToolInvocation`]: backend kind, configuration, and call-time arguments
//! - [`ToolCallRecord`]: executed call, replayed in later transcripts
//!
//! # Architecture
//!
//! - **Domain** (this module): pure definitions, no I/O
//! - **Application** (`ToolLoader`, `ToolStore` ports): loading and lookup
//! - **Infrastructure** (`ToolManager`, `ApiTool`): HTTP execution

pub mod binding;
pub mod call;
pub mod entities;
pub mod invocation;
pub mod record;
pub mod schema;
pub mod value_objects;

pub use binding::{BoundParameters, bind_parameters};
pub use call::{ParseError, ResolvedCall, ToolCallParser, ToolCallRequest};
pub use entities::{API_TOOL, ToolAction, ToolDefinition, ToolId, ToolSet};
pub use invocation::{InvocationError, ToolInvocation};
pub use record::ToolCallRecord;
pub use schema::ExposedToolSchema;
pub use value_objects::{ToolError, ToolOutput};
