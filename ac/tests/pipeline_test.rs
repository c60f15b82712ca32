//! End-to-end tests: SSE lines through reassembly, classification and dispatch

use std::sync::Arc;

use agentcore::config::{CommandConfig, SafetyConfig};
use agentcore::stream::{Completion, SseEvent, SseLineBuffer, StreamAccumulator, parse_sse_line};
use agentcore::tools::{ToolContext, ToolError, ToolRegistry, ToolResult};
use tempfile::TempDir;

/// Feed raw SSE payloads through the line buffer and accumulator
fn reassemble(payloads: &[&str]) -> (String, Completion) {
    let mut buffer = SseLineBuffer::new();
    let mut accumulator = StreamAccumulator::new();
    let mut text = String::new();

    for payload in payloads {
        for line in buffer.push(payload.as_bytes()) {
            if let SseEvent::Chunk(chunk) = parse_sse_line(&line).expect("valid SSE line") {
                let outcome = accumulator.ingest(&chunk);
                text.push_str(&outcome.text);
                if let Some(completion) = outcome.completion {
                    return (text, completion);
                }
            }
        }
    }
    panic!("stream ended without a finish_reason");
}

fn registry() -> ToolRegistry {
    let classifier = Arc::new(SafetyConfig::default().build_classifier().expect("built-in rules compile"));
    ToolRegistry::standard(classifier, &CommandConfig::default())
}

fn tool_call_line(index: u32, id: Option<&str>, name: Option<&str>, arguments: &str) -> String {
    let mut delta = serde_json::json!({"index": index, "function": {"arguments": arguments}});
    if let Some(id) = id {
        delta["id"] = serde_json::json!(id);
    }
    if let Some(name) = name {
        delta["function"]["name"] = serde_json::json!(name);
    }
    let chunk = serde_json::json!({"choices": [{"delta": {"tool_calls": [delta]}, "finish_reason": null}]});
    format!("data: {}\n\n", chunk)
}

const TEXT_LINE: &str = "data: {\"choices\":[{\"delta\":{\"content\":\"Running it now.\"},\"finish_reason\":null}]}\n\n";
const FINISH_LINE: &str = "data: {\"choices\":[{\"delta\":{},\"finish_reason\":\"tool_calls\"}]}\n\ndata: [DONE]\n\n";

#[tokio::test]
async fn test_streamed_command_runs_end_to_end() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    std::fs::write(temp.path().join("notes.txt"), "hello from disk\n").expect("write fixture");

    let first = tool_call_line(0, Some("call_1"), Some("run_command"), "{\"comm");
    let second = tool_call_line(0, None, None, "and\": \"cat notes.txt\"}");
    // Split a payload mid-line to exercise the line buffer
    let (head, tail) = second.split_at(17);

    let (text, completion) = reassemble(&[TEXT_LINE, first.as_str(), head, tail, FINISH_LINE]);
    assert_eq!(text, "Running it now.");

    let calls = completion.into_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].arguments, r#"{"command": "cat notes.txt"}"#);

    let ctx = ToolContext::new(temp.path().to_path_buf(), "pipeline");
    let results = registry().dispatch_all(&calls, &ctx).await;
    assert_eq!(results.len(), 1);

    let (id, outcome) = &results[0];
    let result = ToolResult::from_outcome(id.clone(), outcome);
    assert_eq!(result.tool_call_id, "call_1");
    assert!(!result.is_error);
    assert!(result.content.contains("hello from disk"));
}

#[tokio::test]
async fn test_interleaved_calls_dispatch_in_index_order() {
    let temp = TempDir::new().expect("Failed to create temp dir");

    let payloads = [
        tool_call_line(1, Some("call_b"), Some("run_command"), ""),
        tool_call_line(0, Some("call_a"), Some("run_command"), "{\"command\":"),
        tool_call_line(1, None, None, "{\"command\": \"echo second\"}"),
        tool_call_line(0, None, None, " \"echo first\"}"),
    ];
    let mut all: Vec<&str> = payloads.iter().map(String::as_str).collect();
    all.push(FINISH_LINE);

    let (_, completion) = reassemble(&all);
    let calls = completion.into_calls();
    let ids: Vec<&str> = calls.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["call_a", "call_b"]);

    let ctx = ToolContext::new(temp.path().to_path_buf(), "pipeline");
    let results = registry().dispatch_all(&calls, &ctx).await;
    assert_eq!(results[0].0, "call_a");
    assert!(results[0].1.as_ref().expect("first succeeds").content.contains("first"));
    assert_eq!(results[1].0, "call_b");
    assert!(results[1].1.as_ref().expect("second succeeds").content.contains("second"));
}

#[tokio::test]
async fn test_dangerous_stream_is_refused() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let ctx = ToolContext::new(temp.path().to_path_buf(), "pipeline");

    let blocked = tool_call_line(0, Some("call_1"), Some("run_command"), r#"{"command": "rm -rf /"}"#);
    let irreversible = tool_call_line(1, Some("call_2"), Some("run_command"), r#"{"command": "git reset --hard HEAD~1"}"#);
    let (_, completion) = reassemble(&[blocked.as_str(), irreversible.as_str(), FINISH_LINE]);

    let results = registry().dispatch_all(&completion.into_calls(), &ctx).await;
    assert!(matches!(results[0].1, Err(ToolError::BlockedCommand { .. })));
    match &results[1].1 {
        Err(e) => assert!(e.needs_confirmation(), "expected confirmation refusal, got {e}"),
        Ok(output) => panic!("irreversible command ran: {output:?}"),
    }

    let refused = ToolResult::from_outcome(results[0].0.clone(), &results[0].1);
    assert!(refused.is_error);
    assert!(refused.content.starts_with("Command refused outright"));
}

#[tokio::test]
async fn test_text_only_stream_has_no_tool_calls() {
    let (text, completion) = reassemble(&[
        TEXT_LINE,
        "data: {\"choices\":[{\"delta\":{},\"finish_reason\":\"stop\"}]}\n\n",
    ]);
    assert_eq!(text, "Running it now.");
    assert_eq!(completion, Completion::NoToolCalls);
}

#[tokio::test]
async fn test_unknown_tool_and_bad_arguments_surface_as_errors() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let ctx = ToolContext::new(temp.path().to_path_buf(), "pipeline");

    let unknown = tool_call_line(0, Some("call_1"), Some("launch_rockets"), "{}");
    let malformed = tool_call_line(1, Some("call_2"), Some("run_command"), "{\"command\": ");
    let (_, completion) = reassemble(&[unknown.as_str(), malformed.as_str(), FINISH_LINE]);

    let results = registry().dispatch_all(&completion.into_calls(), &ctx).await;
    assert!(matches!(results[0].1, Err(ToolError::UnknownTool { .. })));
    assert!(matches!(results[1].1, Err(ToolError::InvalidArguments { .. })));
}
