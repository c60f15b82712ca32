//! agentcore CLI entry point

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use eyre::{Context, Result};
use tracing::{debug, info};

use agentcore::cli::{Cli, Command, OutputFormat, get_log_path};
use agentcore::config::Config;
use agentcore::safety::Classification;
use agentcore::stream::{Completion, SseEvent, StreamAccumulator, StreamChunk, ToolCall, parse_sse_line};
use agentcore::tools::{ToolContext, ToolRegistry, ToolResult};

fn parse_level(level: &str) -> tracing::Level {
    match level.to_uppercase().as_str() {
        "TRACE" => tracing::Level::TRACE,
        "DEBUG" => tracing::Level::DEBUG,
        "INFO" => tracing::Level::INFO,
        "WARN" | "WARNING" => tracing::Level::WARN,
        "ERROR" => tracing::Level::ERROR,
        _ => {
            eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", level);
            tracing::Level::INFO
        }
    }
}

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    let log_path = get_log_path();
    if let Some(log_dir) = log_path.parent() {
        fs::create_dir_all(log_dir).context("Failed to create log directory")?;
    }

    // Priority: CLI --log-level > config file > INFO
    let level = cli_log_level
        .or(config_log_level)
        .map(parse_level)
        .unwrap_or(tracing::Level::INFO);

    let log_file = fs::File::create(&log_path).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Command::Classify { command, format } => cmd_classify(&config, &command.join(" "), format),
        Command::Replay {
            file,
            execute,
            approve,
            cwd,
        } => cmd_replay(&config, &file, execute, approve, cwd).await,
        Command::Tools => cmd_tools(&config),
    }
}

fn cmd_classify(config: &Config, command: &str, format: OutputFormat) -> Result<()> {
    debug!(%command, %format, "cmd_classify: called");
    let classifier = config
        .safety
        .build_classifier()
        .context("Failed to build command classifier")?;
    let classification = classifier.classify(command);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&classification)?),
        OutputFormat::Text => print_classification(command, &classification),
    }

    if classification.blocked {
        info!(%command, "cmd_classify: blocked, exiting with 2");
        std::process::exit(2);
    }
    Ok(())
}

fn print_classification(command: &str, classification: &Classification) {
    println!("command:      {}", command);
    println!("tier:         {}", classification.tier);
    println!("confirmation: {}", if classification.requires_confirmation { "required" } else { "no" });
    println!("blocked:      {}", if classification.blocked { "yes" } else { "no" });
    println!("rule:         {}", classification.rule.as_deref().unwrap_or("-"));
    if let Some(hint) = &classification.undo_hint {
        println!("undo:         {}", hint);
    }
}

/// Decode one recorded line: an SSE line or a bare JSON chunk
///
/// `[DONE]` only stands in for a finish chunk when the stream has not
/// already completed through a `finish_reason`.
fn decode_line(line: &str, complete: bool) -> Result<Option<StreamChunk>> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with("data:") || trimmed.starts_with(':') || trimmed.starts_with("event:") {
        return match parse_sse_line(trimmed)? {
            SseEvent::Chunk(chunk) => Ok(Some(chunk)),
            SseEvent::Done if complete => {
                debug!("decode_line: done sentinel after completion, skipping");
                Ok(None)
            }
            SseEvent::Done => Ok(Some(StreamChunk::finish("stop"))),
            SseEvent::Skip => Ok(None),
        };
    }
    let chunk: StreamChunk = serde_json::from_str(trimmed).context(format!("Invalid stream chunk: {}", trimmed))?;
    Ok(Some(chunk))
}

async fn cmd_replay(config: &Config, file: &Path, execute: bool, approve: bool, cwd: Option<PathBuf>) -> Result<()> {
    debug!(?file, %execute, %approve, "cmd_replay: called");
    let content = fs::read_to_string(file).context(format!("Failed to read {}", file.display()))?;

    let mut accumulator = StreamAccumulator::with_max_tool_calls(config.stream.max_tool_calls);
    let mut completion = None;
    for (number, line) in content.lines().enumerate() {
        let Some(chunk) = decode_line(line, accumulator.is_complete()).context(format!("Line {}", number + 1))? else {
            continue;
        };
        let outcome = accumulator.ingest(&chunk);
        print!("{}", outcome.text);
        if outcome.completion.is_some() && completion.is_none() {
            completion = outcome.completion;
        }
    }
    println!();

    let calls = match completion {
        Some(Completion::NoToolCalls) => Vec::new(),
        Some(Completion::ToolCalls(calls)) => calls,
        None => {
            info!("cmd_replay: stream ended without a finish marker, finalizing");
            accumulator.finalize()
        }
    };

    info!(count = %calls.len(), "cmd_replay: reassembled tool calls");
    for call in &calls {
        println!("{}", serde_json::to_string(call)?);
    }

    if execute {
        execute_calls(config, &calls, approve, cwd).await?;
    }
    Ok(())
}

async fn execute_calls(config: &Config, calls: &[ToolCall], approve: bool, cwd: Option<PathBuf>) -> Result<()> {
    let classifier = Arc::new(
        config
            .safety
            .build_classifier()
            .context("Failed to build command classifier")?,
    );
    let registry = ToolRegistry::standard(classifier, &config.command);

    let cwd = match cwd {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to determine current directory")?,
    };
    let ctx = ToolContext::new(cwd, "replay");

    if approve {
        for call in calls {
            let command = serde_json::from_str::<serde_json::Value>(&call.arguments)
                .ok()
                .and_then(|args| args.get("command").and_then(|c| c.as_str()).map(String::from));
            if let Some(command) = command {
                ctx.approve_command(command).await;
            }
        }
    }

    for (id, outcome) in registry.dispatch_all(calls, &ctx).await {
        let result = ToolResult::from_outcome(id, &outcome);
        println!("{}", serde_json::to_string(&result)?);
    }
    Ok(())
}

fn cmd_tools(config: &Config) -> Result<()> {
    debug!("cmd_tools: called");
    let classifier = Arc::new(
        config
            .safety
            .build_classifier()
            .context("Failed to build command classifier")?,
    );
    let registry = ToolRegistry::standard(classifier, &config.command);
    let schemas: Vec<serde_json::Value> = registry.definitions().iter().map(|d| d.to_openai_schema()).collect();
    println!("{}", serde_json::to_string_pretty(&schemas)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_done_after_completion_is_skipped() {
        let mut accumulator = StreamAccumulator::new();
        let finish = decode_line(r#"data: {"choices":[{"delta":{},"finish_reason":"stop"}]}"#, false)
            .unwrap()
            .unwrap();
        assert!(accumulator.ingest(&finish).completion.is_some());

        assert!(decode_line("data: [DONE]", accumulator.is_complete()).unwrap().is_none());
    }

    #[test]
    fn test_done_without_finish_reason_completes_stream() {
        let chunk = decode_line("data: [DONE]", false).unwrap().unwrap();
        assert!(chunk.is_terminal());
    }

    #[test]
    fn test_decode_bare_json_chunk() {
        let chunk = decode_line(r#"{"content":"hi"}"#, false).unwrap().unwrap();
        assert_eq!(chunk.content, "hi");
        assert!(decode_line("   ", false).unwrap().is_none());
    }
}
