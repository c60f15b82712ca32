//! Tool system
//!
//! Tools are registered by name in a [`ToolRegistry`] and invoked with a JSON
//! object of arguments plus a [`ToolContext`] scoped to one agent session.
//! Every failure comes back as a typed [`ToolError`].

mod context;
mod error;
mod registry;
mod traits;

pub mod builtin;

pub use context::ToolContext;
pub use error::ToolError;
pub use registry::ToolRegistry;
pub use traits::{Tool, ToolDefinition, ToolOutput, ToolResult, parse_input};
