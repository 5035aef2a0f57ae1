//! Tool invocation: resolve, bind, shape, load and execute one call.
//!
//! The invoker never touches the transcript; it turns a model-issued
//! [`ToolCallRequest`] into a [`ToolCallRecord`] or a [`GenerationError`]
//! that must halt the generation.

use super::run_generation::GenerationError;
use crate::ports::tool_loader::ToolLoader;
use docent_domain::tool::schema::composite_name;
use docent_domain::util::preview;
use docent_domain::{
    ToolCallParser, ToolCallRecord, ToolCallRequest, ToolError, ToolInvocation, ToolOutput,
    ToolSet, bind_parameters,
};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Executes resolved tool calls against loaded backends
#[derive(Clone)]
pub struct ToolInvoker {
    loader: Arc<dyn ToolLoader>,
    parser: ToolCallParser,
}

impl ToolInvoker {
    pub fn new(loader: Arc<dyn ToolLoader>, parser: ToolCallParser) -> Self {
        Self { loader, parser }
    }

    pub fn parser(&self) -> ToolCallParser {
        self.parser
    }

    /// Handle one call request end to end.
    ///
    /// Backend failures (load or execution) become an `{"error": ...}`
    /// result so the model can react to them. Resolution and configuration
    /// failures are returned as errors and no record is produced.
    pub async fn handle(
        &self,
        tools: &ToolSet,
        call: ToolCallRequest,
    ) -> Result<ToolCallRecord, GenerationError> {
        let resolved = self.parser.parse(&call, tools.ids())?;

        let tool = tools.get(resolved.tool_id.as_str()).ok_or_else(|| {
            GenerationError::Configuration(format!(
                "tool '{}' is no longer available",
                resolved.tool_id
            ))
        })?;
        let action = tool.find_action(&resolved.action_name).ok_or_else(|| {
            GenerationError::Configuration(format!(
                "tool '{}' has no active action '{}'",
                resolved.tool_id, resolved.action_name
            ))
        })?;

        let bound = bind_parameters(action, &resolved.arguments);
        if !bound.ignored.is_empty() {
            debug!(
                "Dropping undeclared arguments for {}: {:?}",
                call.name, bound.ignored
            );
        }

        let invocation = ToolInvocation::prepare(tool, action, bound)
            .map_err(|e| GenerationError::Configuration(e.to_string()))?;

        info!("Executing tool: {} ({})", call.name, invocation.kind);
        debug!(
            "Invocation config: {}, arguments: {}",
            invocation.config,
            serde_json::Value::Object(invocation.arguments.clone())
        );

        let action_name = composite_name(&resolved.action_name, &resolved.tool_id);
        let result = match self.invoke(&invocation).await {
            Ok(output) => output.into_transcript_value().map_err(|source| {
                GenerationError::UnrepresentableResult {
                    action: action_name.clone(),
                    source,
                }
            })?,
            Err(e) => {
                warn!("Tool '{}' failed: {}", action_name, e);
                ToolCallRecord::error_result(e.to_string())
            }
        };
        debug!(
            "Tool '{}' result: {}",
            action_name,
            preview(&result.to_string(), 200)
        );

        Ok(ToolCallRecord {
            tool_name: tool.name.clone(),
            call_id: Some(
                call.id
                    .unwrap_or_else(|| format!("call_{}", Uuid::new_v4())),
            ),
            action_name,
            arguments: resolved.arguments,
            result,
        })
    }

    async fn invoke(&self, invocation: &ToolInvocation) -> Result<ToolOutput, ToolError> {
        let tool = self.loader.load(&invocation.kind, &invocation.config)?;
        tool.execute(&invocation.action_name, &invocation.arguments)
            .await
    }
}
