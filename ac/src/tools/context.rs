//! ToolContext - execution context for tools

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// Execution context for tools - scoped to one agent session
///
/// Clones share the approval set, so an orchestrator can hold one clone and
/// approve commands while handlers read from another.
#[derive(Clone)]
pub struct ToolContext {
    /// Working directory for commands
    pub cwd: PathBuf,

    /// Session identifier (for log correlation)
    pub session_id: String,

    /// Irreversible commands an operator has explicitly confirmed
    approved_commands: Arc<Mutex<HashSet<String>>>,
}

impl ToolContext {
    /// Create a new tool context
    pub fn new(cwd: PathBuf, session_id: impl Into<String>) -> Self {
        let session_id = session_id.into();
        debug!(?cwd, %session_id, "ToolContext::new: called");
        Self {
            cwd,
            session_id,
            approved_commands: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Record external confirmation for an exact command string
    pub async fn approve_command(&self, command: impl Into<String>) {
        let command = command.into();
        debug!(%command, "ToolContext::approve_command: called");
        self.approved_commands.lock().await.insert(command);
    }

    /// Check whether a command was confirmed
    pub async fn is_approved(&self, command: &str) -> bool {
        let result = self.approved_commands.lock().await.contains(command);
        debug!(%command, %result, "ToolContext::is_approved: returning");
        result
    }

    /// Drop all approvals (e.g. at the start of a new turn)
    pub async fn clear_approvals(&self) {
        debug!("ToolContext::clear_approvals: called");
        self.approved_commands.lock().await.clear();
    }
}

impl std::fmt::Debug for ToolContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolContext")
            .field("cwd", &self.cwd)
            .field("session_id", &self.session_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_approve_and_check() {
        let temp = tempdir().unwrap();
        let ctx = ToolContext::new(temp.path().to_path_buf(), "test-session");

        assert!(!ctx.is_approved("rm -rf build").await);
        ctx.approve_command("rm -rf build").await;
        assert!(ctx.is_approved("rm -rf build").await);

        // Approval is for the exact string only
        assert!(!ctx.is_approved("rm -rf build/").await);
    }

    #[tokio::test]
    async fn test_clones_share_approvals() {
        let temp = tempdir().unwrap();
        let ctx = ToolContext::new(temp.path().to_path_buf(), "test-session");
        let handler_view = ctx.clone();

        ctx.approve_command("git reset --hard").await;
        assert!(handler_view.is_approved("git reset --hard").await);

        handler_view.clear_approvals().await;
        assert!(!ctx.is_approved("git reset --hard").await);
    }
}
