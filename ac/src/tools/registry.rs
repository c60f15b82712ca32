//! ToolRegistry - name to handler mapping and dispatch

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::join_all;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::CommandConfig;
use crate::safety::CommandClassifier;
use crate::stream::ToolCall;

use super::builtin::RunCommandTool;
use super::{Tool, ToolContext, ToolDefinition, ToolError, ToolOutput};

/// Registered tools, read-only once built
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        debug!("ToolRegistry::new: called");
        Self::default()
    }

    /// Best-effort bulk registration; on a name collision the first tool wins
    pub fn with_tools(tools: impl IntoIterator<Item = Arc<dyn Tool>>) -> Self {
        debug!("ToolRegistry::with_tools: called");
        let mut registry = Self::new();
        for tool in tools {
            if let Err(e) = registry.register(tool) {
                warn!(error = %e, "ToolRegistry::with_tools: skipping tool");
            }
        }
        registry
    }

    /// Registry with the built-in tools
    pub fn standard(classifier: Arc<CommandClassifier>, command: &CommandConfig) -> Self {
        debug!(?command, "ToolRegistry::standard: called");
        Self::with_tools([Arc::new(RunCommandTool::new(classifier, command.clone())) as Arc<dyn Tool>])
    }

    /// Add a tool; fails if its name is taken
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<(), ToolError> {
        let name = tool.name().to_string();
        if self.tools.contains_key(&name) {
            debug!(%name, "ToolRegistry::register: duplicate name");
            return Err(ToolError::DuplicateTool { name });
        }
        info!(%name, "ToolRegistry::register: registered tool");
        self.tools.insert(name, tool);
        Ok(())
    }

    /// Run the named tool with already-parsed arguments
    pub async fn dispatch(&self, name: &str, input: Value, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        debug!(%name, session_id = %ctx.session_id, "ToolRegistry::dispatch: called");
        let tool = self.tools.get(name).ok_or_else(|| {
            warn!(%name, "ToolRegistry::dispatch: unknown tool");
            ToolError::UnknownTool { name: name.to_string() }
        })?;

        let outcome = match AssertUnwindSafe(tool.execute(input, ctx)).catch_unwind().await {
            Ok(result) => result.map_err(|e| e.normalize(name)),
            Err(panic) => Err(ToolError::HandlerFailure {
                tool: name.to_string(),
                message: format!("handler panicked: {}", panic_message(panic.as_ref())),
            }),
        };

        match &outcome {
            Ok(output) => info!(%name, len = %output.content.len(), warned = %output.warning.is_some(), "ToolRegistry::dispatch: succeeded"),
            Err(e) => warn!(%name, error = %e, "ToolRegistry::dispatch: failed"),
        }
        outcome
    }

    /// Parse a reassembled call's argument text and dispatch it
    pub async fn dispatch_call(&self, call: &ToolCall, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        debug!(id = %call.id, name = %call.name, "ToolRegistry::dispatch_call: called");
        let input = parse_arguments(&call.name, &call.arguments)?;
        self.dispatch(&call.name, input, ctx).await
    }

    /// Dispatch calls concurrently; results keep the input order
    pub async fn dispatch_all(
        &self,
        calls: &[ToolCall],
        ctx: &ToolContext,
    ) -> Vec<(String, Result<ToolOutput, ToolError>)> {
        debug!(count = %calls.len(), "ToolRegistry::dispatch_all: called");
        let outcomes = join_all(calls.iter().map(|call| self.dispatch_call(call, ctx))).await;
        calls.iter().map(|call| call.id.clone()).zip(outcomes).collect()
    }

    pub fn has(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }

    /// Definitions for the model, sorted by name
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        debug!("ToolRegistry::definitions: called");
        let mut defs: Vec<ToolDefinition> = self.tools.values().map(|t| t.definition()).collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry").field("tools", &self.names()).finish()
    }
}

/// Argument text must be a JSON object; empty text means no arguments
fn parse_arguments(tool: &str, arguments: &str) -> Result<Value, ToolError> {
    if arguments.trim().is_empty() {
        return Ok(Value::Object(serde_json::Map::new()));
    }
    match serde_json::from_str::<Value>(arguments) {
        Ok(value @ Value::Object(_)) => Ok(value),
        Ok(other) => Err(ToolError::InvalidArguments {
            tool: tool.to_string(),
            message: format!("expected a JSON object, got {other}"),
        }),
        Err(e) => Err(ToolError::InvalidArguments {
            tool: tool.to_string(),
            message: format!("arguments are not valid JSON: {e}"),
        }),
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
