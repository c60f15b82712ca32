//! agentcore - tool-call plumbing for LLM agents
//!
//! # Modules
//!
//! - [`stream`] - Reassembles streamed tool call fragments into complete calls
//! - [`safety`] - Classifies shell commands by how reversible they are
//! - [`tools`] - Tool trait, registry and dispatch, plus built-in tools
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod cli;
pub mod config;
pub mod safety;
pub mod stream;
pub mod tools;

// Re-export commonly used types
pub use config::{CommandConfig, Config, SafetyConfig, StreamConfig};
pub use safety::{Classification, CommandClassifier, ReversibilityTier, SafetyError};
pub use stream::{Completion, StreamAccumulator, StreamChunk, StreamError, ToolCall, ToolCallDelta};
pub use tools::{Tool, ToolContext, ToolDefinition, ToolError, ToolOutput, ToolRegistry, ToolResult};
