//! Tool call / tool result correlation.
//!
//! Calls live in an append-only arena (`invocations`) in call order; two id
//! maps index into it and make the "pending" and "resolved" states explicit.
//! First result wins: once resolved, an invocation is never touched again.

use roundtrace_types::{ContentBlock, Message, Timestamp, flatten_result_content};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::format::format_duration_ms;

/// A tool call paired with its (possibly absent) result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    pub id: String,
    pub name: String,
    pub input: Value,

    /// Result content, None until a matching result is seen
    pub output: Option<Value>,
    pub is_error: bool,

    pub call_timestamp: Timestamp,
    /// Set on resolution when the result message has a known timestamp
    pub result_timestamp: Option<Timestamp>,
    /// Latency (result - call); only when both are known and causally ordered
    pub duration_ms: Option<u64>,

    /// Position in call order within the correlation window
    pub sequence_index: usize,
    /// Index of the carrying messages within the correlation window
    pub call_message_index: usize,
    pub result_message_index: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvocationStatus {
    Pending,
    Succeeded,
    Failed,
}

impl ToolInvocation {
    /// Resolution is keyed on the result message, not on `output`: a result
    /// without content still resolves its call.
    pub fn is_resolved(&self) -> bool {
        self.result_message_index.is_some()
    }

    pub fn status(&self) -> InvocationStatus {
        match (self.is_resolved(), self.is_error) {
            (false, _) => InvocationStatus::Pending,
            (true, true) => InvocationStatus::Failed,
            (true, false) => InvocationStatus::Succeeded,
        }
    }

    pub fn output_text(&self) -> Option<String> {
        self.output.as_ref().map(flatten_result_content)
    }

    pub fn formatted_duration(&self) -> Option<String> {
        self.duration_ms.map(format_duration_ms)
    }
}

/// Anomalies absorbed during correlation. None of them are errors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrelationReport {
    /// Results whose call is not in the window
    pub orphan_results: usize,
    /// Results for an id that was already resolved (ignored)
    pub duplicate_results: usize,
    /// Calls reusing an id that was already seen
    pub reused_ids: usize,
    /// Calls/results with an empty id or name
    pub skipped_blocks: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Correlation {
    pub invocations: Vec<ToolInvocation>,
    pub report: CorrelationReport,
}

#[derive(Debug, Default)]
pub struct ToolCorrelator {
    invocations: Vec<ToolInvocation>,
    pending: HashMap<String, usize>,
    resolved: HashMap<String, usize>,
    report: CorrelationReport,
    message_index: usize,
}

impl ToolCorrelator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next message of the window; blocks are scanned in document order
    pub fn observe(&mut self, message: &Message) {
        for block in &message.content {
            match block {
                ContentBlock::ToolUse { id, name, input } => {
                    self.on_call(id, name, input, message.timestamp);
                }
                ContentBlock::ToolResult {
                    tool_use_id,
                    content,
                    is_error,
                } => {
                    self.on_result(tool_use_id, content, *is_error, message.timestamp);
                }
                ContentBlock::Text { .. } | ContentBlock::Image { .. } => {}
            }
        }
        self.message_index += 1;
    }

    fn on_call(&mut self, id: &str, name: &str, input: &Value, timestamp: Timestamp) {
        if id.is_empty() || name.is_empty() {
            self.report.skipped_blocks += 1;
            return;
        }

        let sequence_index = self.invocations.len();

        if let Some(superseded) = self.pending.insert(id.to_string(), sequence_index) {
            self.report.reused_ids += 1;
            tracing::debug!(
                id,
                superseded,
                "tool call id reused while pending; earlier call left unresolved"
            );
        } else if self.resolved.contains_key(id) {
            self.report.reused_ids += 1;
            tracing::debug!(id, "tool call id reused after resolution");
        }

        self.invocations.push(ToolInvocation {
            id: id.to_string(),
            name: name.to_string(),
            input: input.clone(),
            output: None,
            is_error: false,
            call_timestamp: timestamp,
            result_timestamp: None,
            duration_ms: None,
            sequence_index,
            call_message_index: self.message_index,
            result_message_index: None,
        });
    }

    fn on_result(&mut self, tool_use_id: &str, content: &Value, is_error: bool, timestamp: Timestamp) {
        if tool_use_id.is_empty() {
            self.report.skipped_blocks += 1;
            return;
        }

        let Some(idx) = self.pending.remove(tool_use_id) else {
            if self.resolved.contains_key(tool_use_id) {
                self.report.duplicate_results += 1;
                tracing::trace!(id = tool_use_id, "ignoring repeated tool result");
            } else {
                self.report.orphan_results += 1;
                tracing::trace!(id = tool_use_id, "dropping orphan tool result");
            }
            return;
        };

        let invocation = &mut self.invocations[idx];
        invocation.output = Some(content.clone());
        invocation.is_error = is_error;
        invocation.result_timestamp = timestamp.is_known().then_some(timestamp);
        invocation.duration_ms = invocation.call_timestamp.millis_until(timestamp);
        invocation.result_message_index = Some(self.message_index);

        self.resolved.insert(tool_use_id.to_string(), idx);
    }

    /// Invocations still waiting for a result, in call order
    pub fn pending(&self) -> impl Iterator<Item = &ToolInvocation> {
        self.invocations.iter().filter(|inv| !inv.is_resolved())
    }

    pub fn resolved(&self) -> impl Iterator<Item = &ToolInvocation> {
        self.invocations.iter().filter(|inv| inv.is_resolved())
    }

    /// Latest invocation carrying `id` (a pending one wins over a resolved one)
    pub fn invocation(&self, id: &str) -> Option<&ToolInvocation> {
        self.pending
            .get(id)
            .or_else(|| self.resolved.get(id))
            .map(|&idx| &self.invocations[idx])
    }

    pub fn invocations(&self) -> &[ToolInvocation] {
        &self.invocations
    }

    pub fn report(&self) -> &CorrelationReport {
        &self.report
    }

    pub fn finish(self) -> Correlation {
        Correlation {
            invocations: self.invocations,
            report: self.report,
        }
    }
}

/// Correlate every tool call in `messages` with its result
pub fn correlate(messages: &[Message]) -> Vec<ToolInvocation> {
    correlate_with_report(messages).invocations
}

pub fn correlate_with_report(messages: &[Message]) -> Correlation {
    let mut correlator = ToolCorrelator::new();
    for message in messages {
        correlator.observe(message);
    }
    correlator.finish()
}
