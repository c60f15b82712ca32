//! Server-sent event decoding for OpenAI-style chat completion streams

use serde::Deserialize;
use tracing::debug;

use super::StreamError;
use super::types::{StreamChunk, ToolCallDelta};

/// One decoded SSE line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseEvent {
    /// A chat completion chunk
    Chunk(StreamChunk),
    /// The `[DONE]` sentinel
    Done,
    /// Blank line, comment or non-data field
    Skip,
}

/// Decode a single SSE line
pub fn parse_sse_line(line: &str) -> Result<SseEvent, StreamError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with(':') {
        return Ok(SseEvent::Skip);
    }

    let Some(data) = line.strip_prefix("data:") else {
        debug!(%line, "parse_sse_line: non-data field, skipping");
        return Ok(SseEvent::Skip);
    };
    let data = data.trim_start();

    if data == "[DONE]" {
        debug!("parse_sse_line: done sentinel");
        return Ok(SseEvent::Done);
    }

    let chunk: OpenAIStreamChunk = serde_json::from_str(data).map_err(|source| StreamError::InvalidChunk {
        data: data.to_string(),
        source,
    })?;

    Ok(SseEvent::Chunk(chunk.into_stream_chunk()))
}

/// Splits arbitrary network payloads into complete lines
///
/// Bytes are held until a newline arrives, so a UTF-8 sequence split across
/// payloads is decoded whole.
#[derive(Debug, Default)]
pub struct SseLineBuffer {
    buffer: Vec<u8>,
}

impl SseLineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a payload and return every line it completed
    pub fn push(&mut self, payload: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(payload);

        let mut lines = Vec::new();
        while let Some(line_end) = self.buffer.iter().position(|&b| b == b'\n') {
            let raw: Vec<u8> = self.buffer.drain(..=line_end).collect();
            let line = String::from_utf8_lossy(&raw[..line_end]);
            lines.push(line.trim_end_matches('\r').to_string());
        }
        lines
    }

    /// Take whatever partial line remains
    pub fn finish(&mut self) -> Option<String> {
        let rest = String::from_utf8_lossy(&std::mem::take(&mut self.buffer)).into_owned();
        (!rest.trim().is_empty()).then_some(rest)
    }
}

// OpenAI wire types

#[derive(Debug, Deserialize)]
struct OpenAIStreamChunk {
    #[serde(default)]
    choices: Vec<OpenAIStreamChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAIStreamChoice {
    #[serde(default)]
    delta: OpenAIStreamDelta,
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct OpenAIStreamDelta {
    content: Option<String>,
    tool_calls: Option<Vec<ToolCallDelta>>,
}

impl OpenAIStreamChunk {
    /// Only the first choice is consumed; agents request a single completion
    fn into_stream_chunk(self) -> StreamChunk {
        match self.choices.into_iter().next() {
            Some(choice) => StreamChunk {
                content: choice.delta.content.unwrap_or_default(),
                tool_calls: choice.delta.tool_calls,
                finish_reason: choice.finish_reason,
            },
            None => StreamChunk::default(),
        }
    }
}
