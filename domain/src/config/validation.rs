//! Configuration validation issues.
//!
//! Validation never fails outright; it returns every detected
//! [`ConfigIssue`] so the binary can report them together and decide
//! whether to continue.

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Fatal: the configuration cannot work at all.
    Error,
    /// Non-fatal: the configuration works but may not behave as expected.
    Warning,
}

/// Identifies a specific configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigIssueCode {
    /// `model.provider` names no known provider.
    UnknownProvider,
    /// `model.name` is empty.
    EmptyModelName,
    /// `agent.max_tool_rounds` is zero, so no tool can ever run.
    ZeroToolRounds,
    /// The system prompt lacks the `{summaries}` placeholder.
    MissingSummariesPlaceholder,
}

/// A detected issue in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub code: ConfigIssueCode,
    /// Dotted key path (e.g. `"agent.max_tool_rounds"`)
    pub field: String,
    pub message: String,
}

impl ConfigIssue {
    pub fn error(code: ConfigIssueCode, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn warning(
        code: ConfigIssueCode,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl std::fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let level = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {}: {}", level, self.field, self.message)
    }
}
