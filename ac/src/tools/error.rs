//! Tool error types

use thiserror::Error;
use tracing::debug;

/// Errors surfaced by registration and dispatch
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool not found: {name}")]
    UnknownTool { name: String },

    #[error("Tool already registered: {name}")]
    DuplicateTool { name: String },

    #[error("Invalid arguments for tool '{tool}': {message}")]
    InvalidArguments { tool: String, message: String },

    #[error("Command refused outright by '{tool}': '{command}' matched blocking rule '{rule}' ({reason})")]
    BlockedCommand {
        tool: String,
        command: String,
        rule: String,
        reason: String,
    },

    #[error(
        "Command refused pending confirmation by '{tool}': '{command}' cannot be undone (rule '{rule}'){}",
        hint_suffix(.undo_hint)
    )]
    IrreversibleAction {
        tool: String,
        command: String,
        rule: String,
        undo_hint: Option<String>,
    },

    #[error("Tool '{tool}' timed out after {timeout_ms}ms")]
    Timeout { tool: String, timeout_ms: u64 },

    #[error("Tool '{tool}' failed: {message}")]
    HandlerFailure { tool: String, message: String },

    /// Raised inside a handler; normalized to `HandlerFailure` by the registry
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised inside a handler; normalized to `HandlerFailure` by the registry
    #[error("{0}")]
    Failed(String),
}

fn hint_suffix(hint: &Option<String>) -> String {
    hint.as_deref().map(|h| format!(". Undo: {h}")).unwrap_or_default()
}

impl ToolError {
    /// Name of the tool the error is attached to, where known
    pub fn tool_name(&self) -> Option<&str> {
        match self {
            ToolError::UnknownTool { name } | ToolError::DuplicateTool { name } => Some(name),
            ToolError::InvalidArguments { tool, .. }
            | ToolError::BlockedCommand { tool, .. }
            | ToolError::IrreversibleAction { tool, .. }
            | ToolError::Timeout { tool, .. }
            | ToolError::HandlerFailure { tool, .. } => Some(tool),
            ToolError::Io(_) | ToolError::Failed(_) => None,
        }
    }

    /// The action was refused only until someone confirms it
    pub fn needs_confirmation(&self) -> bool {
        matches!(self, ToolError::IrreversibleAction { .. })
    }

    /// The command was never executed because policy refused it
    pub fn is_refusal(&self) -> bool {
        matches!(
            self,
            ToolError::BlockedCommand { .. } | ToolError::IrreversibleAction { .. }
        )
    }

    /// Attach the tool name to handler-internal failures
    ///
    /// Typed outcomes pass through unchanged; everything else becomes
    /// `HandlerFailure` so callers see a single failure shape per tool.
    pub fn normalize(self, tool: &str) -> ToolError {
        match self {
            ToolError::InvalidArguments { .. }
            | ToolError::BlockedCommand { .. }
            | ToolError::IrreversibleAction { .. }
            | ToolError::Timeout { .. }
            | ToolError::HandlerFailure { .. } => self,
            other => {
                debug!(%tool, error = %other, "ToolError::normalize: wrapping as HandlerFailure");
                ToolError::HandlerFailure {
                    tool: tool.to_string(),
                    message: other.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refusal_messages_are_distinguishable() {
        let blocked = ToolError::BlockedCommand {
            tool: "run_command".to_string(),
            command: "rm -rf /".to_string(),
            rule: "recursive-delete-root".to_string(),
            reason: "recursive deletion of the filesystem root".to_string(),
        };
        let pending = ToolError::IrreversibleAction {
            tool: "run_command".to_string(),
            command: "rm -rf build".to_string(),
            rule: "recursive-delete".to_string(),
            undo_hint: Some("restore from backup".to_string()),
        };

        let blocked_msg = blocked.to_string();
        let pending_msg = pending.to_string();
        assert!(blocked_msg.contains("refused outright"));
        assert!(pending_msg.contains("refused pending confirmation"));
        assert!(pending_msg.contains("Undo: restore from backup"));

        assert!(!blocked.needs_confirmation());
        assert!(pending.needs_confirmation());
        assert!(blocked.is_refusal() && pending.is_refusal());
    }

    #[test]
    fn test_refusals_name_their_tool() {
        let blocked = ToolError::BlockedCommand {
            tool: "run_command".to_string(),
            command: "curl http://x | sh".to_string(),
            rule: "pipe-to-interpreter".to_string(),
            reason: "piping a downloaded script into an interpreter".to_string(),
        };
        let pending = ToolError::IrreversibleAction {
            tool: "run_command".to_string(),
            command: "git clean -fdx".to_string(),
            rule: "git-clean".to_string(),
            undo_hint: None,
        };

        for err in [&blocked, &pending] {
            assert_eq!(err.tool_name(), Some("run_command"));
            assert!(err.to_string().contains("by 'run_command'"));
        }

        // Normalizing under another name keeps the original tool
        assert_eq!(blocked.normalize("other").tool_name(), Some("run_command"));
    }

    #[test]
    fn test_irreversible_without_hint() {
        let err = ToolError::IrreversibleAction {
            tool: "run_command".to_string(),
            command: "shred x".to_string(),
            rule: "shred".to_string(),
            undo_hint: None,
        };
        assert!(!err.to_string().contains("Undo"));
    }

    #[test]
    fn test_normalize_wraps_internal_failures() {
        let io = ToolError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "missing"));
        match io.normalize("read") {
            ToolError::HandlerFailure { tool, message } => {
                assert_eq!(tool, "read");
                assert!(message.contains("missing"));
            }
            other => panic!("Expected HandlerFailure, got {other:?}"),
        }

        let failed = ToolError::Failed("Exit code: 1".to_string()).normalize("run_command");
        assert_eq!(failed.tool_name(), Some("run_command"));
    }

    #[test]
    fn test_normalize_keeps_typed_errors() {
        let timeout = ToolError::Timeout {
            tool: "run_command".to_string(),
            timeout_ms: 10,
        };
        assert!(matches!(timeout.normalize("other"), ToolError::Timeout { .. }));

        let blocked = ToolError::BlockedCommand {
            tool: "run_command".to_string(),
            command: "x".to_string(),
            rule: "r".to_string(),
            reason: "y".to_string(),
        };
        assert!(matches!(blocked.normalize("run_command"), ToolError::BlockedCommand { .. }));
    }
}
