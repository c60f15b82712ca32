//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// agentcore - tool-call plumbing for LLM agents
#[derive(Parser)]
#[command(
    name = "ac",
    about = "Reassemble streamed tool calls, classify shell commands and dispatch tools",
    version = env!("CARGO_PKG_VERSION"),
    after_help = "Logs are written to: ~/.local/share/agentcore/logs/agentcore.log"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Classify a shell command (exit code 2 if it is blocked)
    Classify {
        /// The command; multiple words are joined with spaces
        #[arg(required = true, num_args = 1.., trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Reassemble tool calls from a recorded stream
    Replay {
        /// File with one JSON chunk or SSE `data:` line per line
        file: PathBuf,

        /// Dispatch the reassembled calls
        #[arg(short, long)]
        execute: bool,

        /// Pre-approve irreversible commands
        #[arg(short, long, requires = "execute")]
        approve: bool,

        /// Working directory for executed commands
        #[arg(long)]
        cwd: Option<PathBuf>,
    },

    /// Print the tool definitions as JSON
    Tools,
}

/// Output format for classify
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown format: {}. Use: text or json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Where the binary writes its log file
pub fn get_log_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("agentcore")
        .join("logs")
        .join("agentcore.log")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_classify() {
        let cli = Cli::parse_from(["ac", "classify", "rm", "-rf", "/tmp/build"]);
        match cli.command {
            Command::Classify { command, format } => {
                assert_eq!(command.join(" "), "rm -rf /tmp/build");
                assert_eq!(format, OutputFormat::Text);
            }
            other => panic!("Expected Classify command, got {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_classify_json() {
        let cli = Cli::parse_from(["ac", "classify", "--format", "json", "ls"]);
        assert!(matches!(
            cli.command,
            Command::Classify {
                format: OutputFormat::Json,
                ..
            }
        ));
    }

    #[test]
    fn test_cli_parse_replay() {
        let cli = Cli::parse_from(["ac", "replay", "stream.jsonl", "--execute", "--approve", "--cwd", "/tmp"]);
        if let Command::Replay {
            file,
            execute,
            approve,
            cwd,
        } = cli.command
        {
            assert_eq!(file, PathBuf::from("stream.jsonl"));
            assert!(execute);
            assert!(approve);
            assert_eq!(cwd, Some(PathBuf::from("/tmp")));
        } else {
            panic!("Expected Replay command");
        }
    }

    #[test]
    fn test_cli_approve_requires_execute() {
        assert!(Cli::try_parse_from(["ac", "replay", "stream.jsonl", "--approve"]).is_err());
    }

    #[test]
    fn test_cli_with_config_and_log_level() {
        let cli = Cli::parse_from(["ac", "-c", "/path/to/config.yml", "-l", "debug", "tools"]);
        assert_eq!(cli.config, Some(PathBuf::from("/path/to/config.yml")));
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        assert!(matches!(cli.command, Command::Tools));
    }

    #[test]
    fn test_output_format_from_str() {
        assert!(matches!("text".parse::<OutputFormat>(), Ok(OutputFormat::Text)));
        assert!(matches!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json)));
        assert!("table".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_log_path() {
        assert!(get_log_path().ends_with("agentcore/logs/agentcore.log"));
    }
}
