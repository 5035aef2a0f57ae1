//! Execution parameters for the generation loop.
//!
//! [`ExecutionParams`] groups the static parameters that control the
//! generation loop in [`RunGenerationUseCase`](crate::use_cases::run_generation::RunGenerationUseCase).
//! These are application-layer concerns, not domain policy.

use serde::{Deserialize, Serialize};

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Generation loop control parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionParams {
    /// Model name passed to the gateway.
    pub model: String,
    /// Maximum tool-call rounds in a single generation.
    ///
    /// A round is one model turn that ends with tool calls. When the model
    /// asks for one more round than this, the calls are not executed and the
    /// generation stops with `RoundLimitReached`.
    pub max_tool_rounds: usize,
}

impl Default for ExecutionParams {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tool_rounds: 10,
        }
    }
}

impl ExecutionParams {
    // ==================== Builder Methods ====================

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_tool_rounds(mut self, max: usize) -> Self {
        self.max_tool_rounds = max;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let params = ExecutionParams::default();
        assert_eq!(params.model, DEFAULT_MODEL);
        assert_eq!(params.max_tool_rounds, 10);
    }

    #[test]
    fn test_builder() {
        let params = ExecutionParams::default()
            .with_model("llama-3.1-70b")
            .with_max_tool_rounds(3);

        assert_eq!(params.model, "llama-3.1-70b");
        assert_eq!(params.max_tool_rounds, 3);
    }
}
