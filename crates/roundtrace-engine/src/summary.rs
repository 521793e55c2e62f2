//! Plain-text rendering of a round, used for clipboard export and as the
//! payload handed to a summary backend.

use roundtrace_types::{ContentBlock, flatten_result_content};
use serde::{Deserialize, Serialize};

use crate::classify::{MessageKind, classify};
use crate::format::{tool_summary, truncate_preview};
use crate::session::Round;

const RESULT_PREVIEW_CHARS: usize = 200;

/// Everything a summary backend needs to describe one round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryPayload {
    pub round_index: usize,
    pub prompt: String,
    pub transcript: String,
    /// Distinct tool names in first-call order
    pub tool_names: Vec<String>,
    pub tokens: u64,
    pub cost_usd: f64,
}

pub fn summary_payload(round: &Round) -> SummaryPayload {
    let mut tool_names: Vec<String> = Vec::new();
    for block in round.assistant_messages.iter().flat_map(|m| &m.content) {
        if let ContentBlock::ToolUse { name, .. } = block
            && !tool_names.contains(name)
        {
            tool_names.push(name.clone());
        }
    }

    SummaryPayload {
        round_index: round.index,
        prompt: round.prompt_text(),
        transcript: round_transcript(round),
        tool_names,
        tokens: round.tokens,
        cost_usd: round.cost_usd,
    }
}

/// Markdown-ish transcript: one `## heading` section per non-empty message
pub fn round_transcript(round: &Round) -> String {
    let mut sections = Vec::new();
    let mut image_number = 0;

    for message in round.messages() {
        let mut lines = Vec::new();
        for block in &message.content {
            match block {
                ContentBlock::Text { text } => {
                    if !text.trim().is_empty() {
                        lines.push(text.trim().to_string());
                    }
                }
                ContentBlock::Image { media_type, .. } => {
                    image_number += 1;
                    lines.push(format!("[Image #{}: {}]", image_number, media_type));
                }
                ContentBlock::ToolUse { name, input, .. } => {
                    let line = format!("-> {} {}", name, tool_summary(input));
                    lines.push(line.trim_end().to_string());
                }
                ContentBlock::ToolResult {
                    content, is_error, ..
                } => {
                    let preview =
                        truncate_preview(&flatten_result_content(content), RESULT_PREVIEW_CHARS);
                    let marker = if *is_error { "<- error: " } else { "<- " };
                    lines.push(format!("{}{}", marker, preview));
                }
            }
        }

        if lines.is_empty() {
            continue;
        }

        let heading = match classify(message) {
            MessageKind::RealPrompt | MessageKind::Empty => "User".to_string(),
            MessageKind::Assistant => "Assistant".to_string(),
            MessageKind::Internal(sub_type) => format!("System ({})", sub_type),
            MessageKind::ToolResultCarrier => "Tool results".to_string(),
        };
        sections.push(format!("## {}\n{}", heading, lines.join("\n")));
    }

    sections.join("\n\n")
}
