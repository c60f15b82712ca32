//! Tool trait definition

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use super::ToolError;
use super::context::ToolContext;

/// A tool that can be called by the LLM
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name (matches the function name the model calls)
    fn name(&self) -> &str;

    /// Human-readable description
    fn description(&self) -> &str;

    /// JSON Schema for input parameters, passed through to the model
    fn parameters(&self) -> Value;

    /// Execute the tool with a JSON object of arguments
    async fn execute(&self, input: Value, ctx: &ToolContext) -> Result<ToolOutput, ToolError>;

    /// Model-facing definition
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(self.name(), self.description(), self.parameters())
    }
}

/// Deserialize a tool's arguments into its typed input
///
/// This is the single place argument validation failures are produced.
pub fn parse_input<T: DeserializeOwned>(tool: &str, input: Value) -> Result<T, ToolError> {
    debug!(%tool, "parse_input: called");
    serde_json::from_value(input).map_err(|e| ToolError::InvalidArguments {
        tool: tool.to_string(),
        message: e.to_string(),
    })
}

/// Raw result of a successful tool execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    pub content: String,

    /// Advisory note for the caller, e.g. an undo hint for a risky command
    pub warning: Option<String>,
}

impl ToolOutput {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            warning: None,
        }
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warning = Some(warning.into());
        self
    }
}

/// Tool outcome in the shape sent back to the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolResult {
    pub tool_call_id: String,
    pub content: String,
    pub is_error: bool,
}

impl ToolResult {
    /// Create a successful result
    pub fn success(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            content: content.into(),
            is_error: false,
        }
    }

    /// Create an error result
    pub fn error(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            content: content.into(),
            is_error: true,
        }
    }

    /// Flatten a dispatch outcome, putting any warning ahead of the content
    pub fn from_outcome(tool_call_id: impl Into<String>, outcome: &Result<ToolOutput, ToolError>) -> Self {
        match outcome {
            Ok(output) => match &output.warning {
                Some(warning) => Self::success(tool_call_id, format!("Warning: {}\n\n{}", warning, output.content)),
                None => Self::success(tool_call_id, output.content.clone()),
            },
            Err(e) => Self::error(tool_call_id, e.to_string()),
        }
    }
}

/// Tool definition advertised to the model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

impl ToolDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>, parameters: Value) -> Self {
        let name = name.into();
        debug!(%name, "ToolDefinition::new: called");
        Self {
            name,
            description: description.into(),
            parameters,
        }
    }

    /// Convert to the OpenAI function-tool envelope
    pub fn to_openai_schema(&self) -> Value {
        serde_json::json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": self.parameters,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    #[serde(deny_unknown_fields)]
    struct EchoInput {
        text: String,
    }

    #[test]
    fn test_parse_input_typed() {
        let input: EchoInput = parse_input("echo", serde_json::json!({"text": "hi"})).unwrap();
        assert_eq!(input.text, "hi");
    }

    #[test]
    fn test_parse_input_rejects_bad_arguments() {
        let err = parse_input::<EchoInput>("echo", serde_json::json!({"txt": "hi"})).unwrap_err();
        match err {
            ToolError::InvalidArguments { tool, message } => {
                assert_eq!(tool, "echo");
                assert!(message.contains("txt"));
            }
            other => panic!("Expected InvalidArguments, got {other:?}"),
        }
    }

    #[test]
    fn test_tool_result_from_outcome() {
        let ok = ToolResult::from_outcome("c1", &Ok(ToolOutput::new("done")));
        assert_eq!(ok, ToolResult::success("c1", "done"));

        let warned = ToolResult::from_outcome("c2", &Ok(ToolOutput::new("pushed").with_warning("force push")));
        assert!(!warned.is_error);
        assert!(warned.content.starts_with("Warning: force push"));
        assert!(warned.content.ends_with("pushed"));

        let failed = ToolResult::from_outcome("c3", &Err(ToolError::UnknownTool { name: "nope".to_string() }));
        assert!(failed.is_error);
        assert_eq!(failed.content, "Tool not found: nope");
    }

    #[test]
    fn test_definition_to_openai_schema() {
        let def = ToolDefinition::new(
            "run_command",
            "Run a command",
            serde_json::json!({"type": "object", "properties": {}}),
        );
        let schema = def.to_openai_schema();
        assert_eq!(schema["type"], "function");
        assert_eq!(schema["function"]["name"], "run_command");
        assert!(schema["function"]["parameters"].is_object());
    }
}
