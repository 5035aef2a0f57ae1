//! Domain layer for docent
//!
//! This crate contains the core types and pure algorithms of the
//! tool-augmented generation loop. It has no dependencies on
//! infrastructure or presentation concerns and performs no I/O.
//!
//! # Core Concepts
//!
//! ## Tools and Actions
//!
//! A [`ToolDefinition`] groups one or more [`ToolAction`]s. Each action
//! declares four parameter groups (query params, headers, body, generic
//! parameters). The model only ever sees the [`ExposedToolSchema`]
//! projection, named `{action}_{tool_id}`.
//!
//! ## The call pipeline
//!
//! ```text
//! ToolCallRequest ─▶ ToolCallParser ─▶ ResolvedCall ─▶ bind_parameters ─▶ ToolInvocation
//!                     (vendor format)                   (static + model)
//! ```
//!
//! ## Conversation
//!
//! [`ConversationBuilder`] turns a system prompt, retrieved documents, and
//! stored [`ConversationTurn`]s into the [`Message`] sequence sent to the
//! model on every round.

pub mod config;
pub mod core;
pub mod generation;
pub mod prompt;
pub mod retrieval;
pub mod session;
pub mod tool;
pub mod util;

// Re-export commonly used types
pub use config::{ConfigIssue, ConfigIssueCode, OutputFormat, Severity};
pub use core::{error::DomainError, provider::ProviderKind, query::Query};
pub use generation::GenerationEvent;
pub use prompt::{ConversationBuilder, PromptTemplate, SUMMARIES_PLACEHOLDER};
pub use retrieval::RetrievedDocument;
pub use session::{
    entities::{
        ContentPart, FunctionCall, FunctionResponse, FunctionResult, Message, MessageContent, Role,
    },
    history::ConversationTurn,
    stream::StreamEvent,
};
pub use tool::{
    binding::{BoundParameters, bind_parameters},
    call::{ParseError, ResolvedCall, ToolCallParser, ToolCallRequest},
    entities::{
        API_TOOL, ParamLocation, ParameterField, ParameterGroup, ToolAction, ToolDefinition, ToolId,
        ToolSet,
    },
    invocation::{InvocationError, ToolInvocation},
    record::ToolCallRecord,
    schema::ExposedToolSchema,
    value_objects::{ToolError, ToolOutput, UnrepresentableOutput},
};
