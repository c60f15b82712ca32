//! Stream chunk and tool call types
//!
//! These model the provider-neutral chunk shape the accumulator consumes. The
//! field nesting (`function.name`, `function.arguments`) follows the OpenAI
//! chat-completions delta format so recorded streams can be replayed as-is.

use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

/// One chunk of a streamed model response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamChunk {
    /// Plain text content (possibly empty)
    #[serde(default, deserialize_with = "null_as_empty")]
    pub content: String,

    /// Tool call fragments carried by this chunk
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCallDelta>>,

    /// Terminal marker; non-null signals the end of the stream
    #[serde(default)]
    pub finish_reason: Option<String>,
}

impl StreamChunk {
    /// A chunk carrying only text
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    /// A chunk carrying only tool call deltas
    pub fn deltas(deltas: Vec<ToolCallDelta>) -> Self {
        debug!(count = %deltas.len(), "StreamChunk::deltas: called");
        Self {
            tool_calls: Some(deltas),
            ..Default::default()
        }
    }

    /// A terminal chunk with the given finish reason
    pub fn finish(reason: impl Into<String>) -> Self {
        Self {
            finish_reason: Some(reason.into()),
            ..Default::default()
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.finish_reason.is_some()
    }
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// One fragment of a streamed function call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCallDelta {
    /// Which logical call this fragment belongs to
    pub index: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<FunctionDelta>,
}

/// Name and argument text of a function call fragment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionDelta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<String>,
}

impl ToolCallDelta {
    /// Delta for `index` with no fields set
    pub fn new(index: u32) -> Self {
        Self {
            index,
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.function.get_or_insert_with(FunctionDelta::default).name = Some(name.into());
        self
    }

    pub fn with_arguments(mut self, fragment: impl Into<String>) -> Self {
        self.function.get_or_insert_with(FunctionDelta::default).arguments = Some(fragment.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.function.as_ref().and_then(|f| f.name.as_deref())
    }

    pub fn arguments(&self) -> Option<&str> {
        self.function.as_ref().and_then(|f| f.arguments.as_deref())
    }
}

/// A complete tool call reassembled from a finished stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,

    /// Raw JSON argument text; parsed by the dispatcher, not here
    pub arguments: String,

    pub index: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_chunk_with_deltas() {
        let json = r#"{
            "content": "",
            "tool_calls": [
                {"index": 0, "id": "call_1", "function": {"name": "run_command", "arguments": "{\"co"}}
            ],
            "finish_reason": null
        }"#;

        let chunk: StreamChunk = serde_json::from_str(json).unwrap();
        assert!(!chunk.is_terminal());

        let deltas = chunk.tool_calls.unwrap();
        assert_eq!(deltas.len(), 1);
        assert_eq!(deltas[0].index, 0);
        assert_eq!(deltas[0].id.as_deref(), Some("call_1"));
        assert_eq!(deltas[0].name(), Some("run_command"));
        assert_eq!(deltas[0].arguments(), Some("{\"co"));
    }

    #[test]
    fn test_deserialize_minimal_chunk() {
        let chunk: StreamChunk = serde_json::from_str(r#"{"finish_reason": "stop"}"#).unwrap();
        assert_eq!(chunk.content, "");
        assert!(chunk.tool_calls.is_none());
        assert!(chunk.is_terminal());
    }

    #[test]
    fn test_null_content_is_empty() {
        let chunk: StreamChunk = serde_json::from_str(r#"{"content": null, "finish_reason": null}"#).unwrap();
        assert_eq!(chunk.content, "");
    }

    #[test]
    fn test_delta_builders() {
        let delta = ToolCallDelta::new(2).with_name("read").with_arguments("{}");
        assert_eq!(delta.index, 2);
        assert!(delta.id.is_none());
        assert_eq!(delta.name(), Some("read"));
        assert_eq!(delta.arguments(), Some("{}"));
    }
}
