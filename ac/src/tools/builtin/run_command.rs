//! run_command tool - execute shell commands behind the safety classifier

use async_trait::async_trait;
use nix::sys::signal::{Signal, killpg};
use nix::unistd::Pid;
use serde::Deserialize;
use serde_json::Value;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{debug, info, warn};

use crate::config::CommandConfig;
use crate::safety::CommandClassifier;
use crate::tools::{Tool, ToolContext, ToolError, ToolOutput, parse_input};

const TOOL_NAME: &str = "run_command";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RunCommandInput {
    command: String,
    timeout_ms: Option<u64>,
    /// Free-form note from the model; logged only
    description: Option<String>,
}

/// Execute a shell command in the context's working directory
pub struct RunCommandTool {
    classifier: Arc<CommandClassifier>,
    config: CommandConfig,
}

impl RunCommandTool {
    pub fn new(classifier: Arc<CommandClassifier>, config: CommandConfig) -> Self {
        debug!(?config, "RunCommandTool::new: called");
        Self { classifier, config }
    }

    /// Refuse or annotate a command before it runs
    async fn gate(&self, command: &str, ctx: &ToolContext) -> Result<Option<String>, ToolError> {
        let classification = self.classifier.classify(command);
        let rule = classification.rule.clone().unwrap_or_default();

        if classification.blocked {
            let reason = self
                .classifier
                .blocking_rule(command)
                .map(|r| r.reason().to_string())
                .unwrap_or_default();
            warn!(%command, %rule, "RunCommandTool::gate: blocked");
            return Err(ToolError::BlockedCommand {
                tool: TOOL_NAME.to_string(),
                command: command.to_string(),
                rule,
                reason,
            });
        }

        if classification.is_irreversible() && !ctx.is_approved(command).await {
            info!(%command, %rule, "RunCommandTool::gate: irreversible, awaiting confirmation");
            return Err(ToolError::IrreversibleAction {
                tool: TOOL_NAME.to_string(),
                command: command.to_string(),
                rule,
                undo_hint: classification.undo_hint,
            });
        }

        if !classification.requires_confirmation {
            debug!(tier = %classification.tier, "RunCommandTool::gate: allowed");
            return Ok(None);
        }

        let mut warning = format!("'{}' classified {} by rule '{}'", command, classification.tier, rule);
        if let Some(hint) = &classification.undo_hint {
            warning.push_str(&format!(". Undo: {}", hint));
        }
        debug!(%warning, "RunCommandTool::gate: allowed with warning");
        Ok(Some(warning))
    }

    fn format_output(&self, stdout: &str, stderr: &str) -> String {
        let result = if stdout.is_empty() && !stderr.is_empty() {
            stderr.to_string()
        } else if stderr.is_empty() {
            stdout.to_string()
        } else {
            format!("{}\n\nSTDERR:\n{}", stdout, stderr)
        };
        truncate(result, self.config.max_output_chars)
    }
}

async fn read_pipe<R: AsyncRead + Unpin>(pipe: Option<R>) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        pipe.read_to_end(&mut buf).await?;
    }
    Ok(buf)
}

/// SIGKILL the whole group led by the shell
fn kill_process_group(pgid: Option<u32>) {
    let Some(pgid) = pgid else {
        return;
    };
    match killpg(Pid::from_raw(pgid as i32), Signal::SIGKILL) {
        Ok(()) => debug!(%pgid, "kill_process_group: sent SIGKILL"),
        Err(e) => debug!(%pgid, error = %e, "kill_process_group: killpg failed"),
    }
}

/// Cut at the nearest char boundary at or below `max` bytes
fn truncate(text: String, max: usize) -> String {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    debug!(len = %text.len(), %max, "truncate: truncating long output");
    format!("{}...\n[truncated, {} bytes total]", &text[..end], text.len())
}

#[async_trait]
impl Tool for RunCommandTool {
    fn name(&self) -> &str {
        TOOL_NAME
    }

    fn description(&self) -> &str {
        "Execute a shell command in the working directory. Destructive commands are refused \
         outright or held until confirmed."
    }

    fn parameters(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "command": {
                    "type": "string",
                    "description": "Shell command to execute"
                },
                "timeout_ms": {
                    "type": "integer",
                    "description": format!("Timeout in milliseconds (default: {})", self.config.timeout_ms)
                },
                "description": {
                    "type": "string",
                    "description": "Short note on what the command is for"
                }
            },
            "required": ["command"]
        })
    }

    async fn execute(&self, input: Value, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let input: RunCommandInput = parse_input(TOOL_NAME, input)?;
        debug!(command = %input.command, description = ?input.description, "RunCommandTool::execute: called");

        let warning = self.gate(&input.command, ctx).await?;

        let timeout_ms = input.timeout_ms.unwrap_or(self.config.timeout_ms);
        debug!(%timeout_ms, shell = %self.config.shell, "RunCommandTool::execute: spawning command");

        // Own process group, so a timeout takes down everything the shell started
        let mut child = tokio::process::Command::new(&self.config.shell)
            .arg("-c")
            .arg(&input.command)
            .current_dir(&ctx.cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .process_group(0)
            .spawn()?;
        let pgid = child.id();
        let stdout_pipe = child.stdout.take();
        let stderr_pipe = child.stderr.take();

        let run = async { tokio::try_join!(child.wait(), read_pipe(stdout_pipe), read_pipe(stderr_pipe)) };
        let (status, stdout, stderr) = match tokio::time::timeout(Duration::from_millis(timeout_ms), run).await {
            Ok(result) => result?,
            Err(_) => {
                warn!(command = %input.command, %timeout_ms, "RunCommandTool::execute: command timed out");
                kill_process_group(pgid);
                if let Err(e) = child.wait().await {
                    debug!(error = %e, "RunCommandTool::execute: failed to reap timed out command");
                }
                return Err(ToolError::Timeout {
                    tool: TOOL_NAME.to_string(),
                    timeout_ms,
                });
            }
        };

        let stdout = String::from_utf8_lossy(&stdout);
        let stderr = String::from_utf8_lossy(&stderr);
        debug!(stdout_len = %stdout.len(), stderr_len = %stderr.len(), "RunCommandTool::execute: output lengths");
        let content = self.format_output(&stdout, &stderr);

        if !status.success() {
            debug!(exit_code = ?status.code(), "RunCommandTool::execute: command failed");
            return Err(ToolError::Failed(format!(
                "Exit code: {}\n{}",
                status.code().unwrap_or(-1),
                content
            )));
        }

        let output = ToolOutput::new(content);
        Ok(match warning {
            Some(warning) => output.with_warning(warning),
            None => output,
        })
    }
}
