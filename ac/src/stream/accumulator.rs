//! StreamAccumulator - reassembles streamed tool call fragments
//!
//! Fragments are keyed by call index. Each index owns one slot in a small
//! arena; a slot is created by the first fragment that names the index,
//! mutated by later ones, and consumed when the session finishes.

use tracing::{debug, warn};

use super::types::{StreamChunk, ToolCall, ToolCallDelta};

/// Upper bound on distinct call indices tracked per session
pub const DEFAULT_MAX_TOOL_CALLS: usize = 128;

/// In-progress record for one call index
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct PartialToolCall {
    id: String,
    name: String,
    arguments: String,
}

impl PartialToolCall {
    fn seeded(delta: &ToolCallDelta) -> Self {
        Self {
            id: delta.id.clone().unwrap_or_default(),
            name: delta.name().unwrap_or_default().to_string(),
            arguments: delta.arguments().unwrap_or_default().to_string(),
        }
    }

    /// Apply a later fragment. Identity fields are set at most once.
    fn merge(&mut self, index: u32, delta: &ToolCallDelta) {
        if let Some(id) = delta.id.as_deref().filter(|id| !id.is_empty()) {
            if self.id.is_empty() {
                self.id = id.to_string();
            } else if self.id != id {
                warn!(%index, existing = %self.id, ignored = %id, "PartialToolCall::merge: ignoring id overwrite");
            }
        }

        if let Some(name) = delta.name().filter(|n| !n.is_empty()) {
            if self.name.is_empty() {
                self.name = name.to_string();
            } else if self.name != name {
                warn!(%index, existing = %self.name, ignored = %name, "PartialToolCall::merge: ignoring name overwrite");
            }
        }

        if let Some(fragment) = delta.arguments() {
            self.arguments.push_str(fragment);
        }
    }

    fn is_complete(&self) -> bool {
        !self.id.is_empty() && !self.name.is_empty()
    }
}

/// What the stream produced once it ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// The stream ended without any tool call fragments
    NoToolCalls,
    /// Complete calls ordered by index; may be empty if every record was partial
    ToolCalls(Vec<ToolCall>),
}

impl Completion {
    pub fn into_calls(self) -> Vec<ToolCall> {
        match self {
            Completion::NoToolCalls => Vec::new(),
            Completion::ToolCalls(calls) => calls,
        }
    }
}

/// Result of ingesting one chunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestOutcome {
    /// The text fragment carried by this chunk
    pub text: String,

    /// Set only when this chunk carried the terminal marker
    pub completion: Option<Completion>,
}

/// Accumulates one streamed response
///
/// Not shared between streams: use one instance per stream, or call
/// [`reset`](Self::reset) before reusing it.
#[derive(Debug, Clone)]
pub struct StreamAccumulator {
    slots: Vec<Option<PartialToolCall>>,
    text: String,
    max_tool_calls: usize,
    complete: bool,
}

impl Default for StreamAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamAccumulator {
    pub fn new() -> Self {
        Self::with_max_tool_calls(DEFAULT_MAX_TOOL_CALLS)
    }

    /// Create an accumulator that ignores deltas with `index >= max_tool_calls`
    pub fn with_max_tool_calls(max_tool_calls: usize) -> Self {
        debug!(%max_tool_calls, "StreamAccumulator::with_max_tool_calls: called");
        Self {
            slots: Vec::new(),
            text: String::new(),
            max_tool_calls,
            complete: false,
        }
    }

    /// Consume one chunk in arrival order
    pub fn ingest(&mut self, chunk: &StreamChunk) -> IngestOutcome {
        debug!(
            text_len = %chunk.content.len(),
            deltas = ?chunk.tool_calls.as_ref().map(Vec::len),
            finish_reason = ?chunk.finish_reason,
            "StreamAccumulator::ingest: called"
        );

        if self.complete {
            warn!("StreamAccumulator::ingest: session already complete, call reset() before reuse");
            return IngestOutcome {
                text: String::new(),
                completion: None,
            };
        }

        self.text.push_str(&chunk.content);

        if let Some(deltas) = &chunk.tool_calls {
            for delta in deltas {
                self.apply(delta);
            }
        }

        let completion = if chunk.is_terminal() {
            debug!("StreamAccumulator::ingest: terminal chunk, finalizing");
            let had_records = self.record_count() > 0;
            let calls = self.finalize();
            if had_records {
                Some(Completion::ToolCalls(calls))
            } else {
                Some(Completion::NoToolCalls)
            }
        } else {
            None
        };

        IngestOutcome {
            text: chunk.content.clone(),
            completion,
        }
    }

    fn apply(&mut self, delta: &ToolCallDelta) {
        let index = delta.index as usize;
        if index >= self.max_tool_calls {
            warn!(%index, max = %self.max_tool_calls, "StreamAccumulator::apply: index out of range, dropping delta");
            return;
        }

        if self.slots.len() <= index {
            self.slots.resize(index + 1, None);
        }

        let slot = &mut self.slots[index];
        match slot {
            Some(record) => {
                debug!(%index, "StreamAccumulator::apply: updating record");
                record.merge(delta.index, delta);
            }
            None => {
                debug!(%index, "StreamAccumulator::apply: creating record");
                *slot = Some(PartialToolCall::seeded(delta));
            }
        }
    }

    /// Mark the session complete and return the complete calls by index
    ///
    /// Records missing an id or a name are dropped.
    pub fn finalize(&mut self) -> Vec<ToolCall> {
        debug!(records = %self.record_count(), "StreamAccumulator::finalize: called");
        self.complete = true;
        self.collect()
    }

    /// The finalized calls, or `None` while the stream is still open
    pub fn tool_calls(&self) -> Option<Vec<ToolCall>> {
        self.complete.then(|| self.collect())
    }

    fn collect(&self) -> Vec<ToolCall> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| {
                let record = slot.as_ref()?;
                if !record.is_complete() {
                    debug!(%index, "StreamAccumulator::collect: dropping incomplete record");
                    return None;
                }
                Some(ToolCall {
                    id: record.id.clone(),
                    name: record.name.clone(),
                    arguments: record.arguments.clone(),
                    index: index as u32,
                })
            })
            .collect()
    }

    /// Clear all per-session state
    pub fn reset(&mut self) {
        debug!("StreamAccumulator::reset: called");
        self.slots.clear();
        self.text.clear();
        self.complete = false;
    }

    /// All text content seen so far
    pub fn full_text(&self) -> &str {
        &self.text
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Number of call indices that have a record, complete or not
    pub fn record_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }
}
