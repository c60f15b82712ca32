//! Built-in tools

mod run_command;

pub use run_command::RunCommandTool;
