use roundtrace_types::{Message, Timestamp};
use serde::{Deserialize, Serialize};

use crate::correlation::{CorrelationReport, ToolInvocation};

// ==========================================
// 1. Session (entire conversation)
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub project_id: String,
    pub session_id: String,

    /// Decoded messages, in log order
    pub messages: Vec<Message>,

    /// Number of leading messages that precede the first real prompt
    pub preamble_len: usize,

    pub rounds: Vec<Round>,

    /// Session-wide correlation, in call order
    pub invocations: Vec<ToolInvocation>,
    pub correlation: CorrelationReport,

    pub stats: SessionStats,
}

// ==========================================
// 2. Round (user-initiated interaction unit)
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Round {
    pub index: usize,

    /// Round trigger (a real prompt)
    pub user_message: Message,

    /// Everything until the next real prompt: assistant replies and the
    /// internal user-role messages (tool results, summaries, hooks)
    pub assistant_messages: Vec<Message>,

    /// Position of `user_message` in the segmented sequence
    pub offset: usize,

    /// Σ(input + output) over `assistant_messages`
    pub tokens: u64,
    pub cost_usd: f64,
    /// ToolUse blocks in `assistant_messages`
    pub tool_call_count: usize,

    pub timestamp: Timestamp,
}

/// Output of segmentation: rounds plus the messages that precede the first prompt
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Segmentation {
    pub preamble: Vec<Message>,
    pub rounds: Vec<Round>,
}

/// Which message slice a correlation pass sees
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationWindow {
    /// Whole session: calls and results match across round boundaries
    #[default]
    Session,
    /// One round: results whose call happened in an earlier round are orphans
    Round,
}

// --- Stats ---

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenTotals {
    pub input: u64,
    pub output: u64,
    pub cache_read: u64,
    pub cache_creation: u64,
}

impl TokenTotals {
    /// Input + output; cache traffic is reported separately
    pub fn total(&self) -> u64 {
        self.input.saturating_add(self.output)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCounts {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub pending: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoundStats {
    pub index: usize,
    pub tokens: TokenTotals,
    pub cost_usd: f64,
    pub tools: ToolCounts,
    pub image_count: usize,
    /// From the prompt to the last message of the round, when both are known
    pub duration_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    pub round_count: usize,
    pub message_count: usize,
    pub preamble_count: usize,
    pub tokens: TokenTotals,
    pub cost_usd: f64,
    pub tools: ToolCounts,
    pub image_count: usize,
    /// First to last known timestamp
    pub duration_ms: Option<u64>,
}

impl Round {
    /// Prompt followed by the rest of the round, in log order
    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        std::iter::once(&self.user_message).chain(self.assistant_messages.iter())
    }

    pub fn message_count(&self) -> usize {
        1 + self.assistant_messages.len()
    }

    /// One past the last message of the round in the segmented sequence
    pub fn end_offset(&self) -> usize {
        self.offset + self.message_count()
    }

    pub fn prompt_text(&self) -> String {
        self.user_message.text()
    }
}
