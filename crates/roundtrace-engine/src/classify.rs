use roundtrace_types::{ContentBlock, Message, Role, SubType};
use serde::{Deserialize, Serialize};

/// Why a message does or does not open a round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "sub_type", rename_all = "snake_case")]
pub enum MessageKind {
    /// User-authored prompt with visible text or an image
    RealPrompt,
    Assistant,
    /// Bookkeeping message injected by the assistant (summary, hook, ...)
    Internal(SubType),
    /// User-role message that only carries tool results back to the model
    ToolResultCarrier,
    /// User-role message with nothing to show (blank text, no blocks)
    Empty,
}

/// Classify a message. Pure and order-independent.
pub fn classify(message: &Message) -> MessageKind {
    if message.role != Role::User {
        return MessageKind::Assistant;
    }

    if let Some(sub_type) = &message.sub_type
        && sub_type.is_internal()
    {
        return MessageKind::Internal(sub_type.clone());
    }

    let mut has_visible_text = false;
    let mut has_text = false;
    let mut has_image = false;
    let mut all_tool_results = !message.content.is_empty();

    for block in &message.content {
        match block {
            ContentBlock::Text { text } => {
                has_text = true;
                has_visible_text |= !text.trim().is_empty();
                all_tool_results = false;
            }
            ContentBlock::Image { .. } => {
                has_image = true;
                all_tool_results = false;
            }
            ContentBlock::ToolUse { .. } => all_tool_results = false,
            ContentBlock::ToolResult { .. } => {}
        }
    }

    if all_tool_results && !has_text && !has_image {
        return MessageKind::ToolResultCarrier;
    }

    if has_visible_text || has_image {
        MessageKind::RealPrompt
    } else {
        MessageKind::Empty
    }
}

/// True when the message is a user-authored prompt that starts a new round
pub fn is_real_user_prompt(message: &Message) -> bool {
    classify(message) == MessageKind::RealPrompt
}
