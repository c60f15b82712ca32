//! Streamed tool call reassembly
//!
//! Turns the fragments of a streaming model response into complete, ordered
//! tool calls plus the response's plain text.

mod accumulator;
mod sse;
mod types;

use thiserror::Error;

pub use accumulator::{Completion, DEFAULT_MAX_TOOL_CALLS, IngestOutcome, StreamAccumulator};
pub use sse::{SseEvent, SseLineBuffer, parse_sse_line};
pub use types::{FunctionDelta, StreamChunk, ToolCall, ToolCallDelta};

/// Errors decoding a stream transport
///
/// Malformed tool call fragments are not errors; the accumulator drops them.
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("Invalid stream chunk '{data}': {source}")]
    InvalidChunk {
        data: String,
        #[source]
        source: serde_json::Error,
    },
}
