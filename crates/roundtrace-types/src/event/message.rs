use serde::{Deserialize, Serialize};
use std::fmt;

use super::block::ContentBlock;
use super::usage::Usage;
use crate::timestamp::Timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Role::User),
            "assistant" => Some(Role::Assistant),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bookkeeping marker attached to messages the assistant injects into the log.
///
/// Unknown markers are preserved as `Other` and carry no classification meaning.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SubType {
    System,
    Summary,
    Hook,
    MicrocompactionBoundary,
    QueueOperation,
    FileHistorySnapshot,
    Other(String),
}

impl SubType {
    pub fn parse(s: &str) -> Self {
        match s {
            "system" => SubType::System,
            "summary" => SubType::Summary,
            "hook" => SubType::Hook,
            "microcompaction-boundary" => SubType::MicrocompactionBoundary,
            "queue-operation" => SubType::QueueOperation,
            "file-history-snapshot" => SubType::FileHistorySnapshot,
            other => SubType::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            SubType::System => "system",
            SubType::Summary => "summary",
            SubType::Hook => "hook",
            SubType::MicrocompactionBoundary => "microcompaction-boundary",
            SubType::QueueOperation => "queue-operation",
            SubType::FileHistorySnapshot => "file-history-snapshot",
            SubType::Other(s) => s,
        }
    }

    /// Internal bookkeeping markers never start a round.
    pub fn is_internal(&self) -> bool {
        !matches!(self, SubType::Other(_))
    }
}

impl From<String> for SubType {
    fn from(s: String) -> Self {
        SubType::parse(&s)
    }
}

impl From<SubType> for String {
    fn from(sub_type: SubType) -> Self {
        sub_type.as_str().to_string()
    }
}

impl fmt::Display for SubType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the conversation log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Log record id (uuid), when the source provides one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub role: Role,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_type: Option<SubType>,

    #[serde(default)]
    pub timestamp: Timestamp,

    #[serde(default)]
    pub content: Vec<ContentBlock>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_usd: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl Message {
    pub fn new(role: Role, content: Vec<ContentBlock>) -> Self {
        Self {
            id: None,
            role,
            sub_type: None,
            timestamp: Timestamp::UNKNOWN,
            content,
            usage: None,
            cost_usd: None,
            model: None,
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, vec![ContentBlock::text(text)])
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, vec![ContentBlock::text(text)])
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_sub_type(mut self, sub_type: SubType) -> Self {
        self.sub_type = Some(sub_type);
        self
    }

    pub fn with_timestamp(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_usage(mut self, usage: Usage) -> Self {
        self.usage = Some(usage);
        self
    }

    pub fn with_cost(mut self, cost_usd: f64) -> Self {
        self.cost_usd = Some(cost_usd);
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Text blocks joined by newlines
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                ContentBlock::Image { .. }
                | ContentBlock::ToolUse { .. }
                | ContentBlock::ToolResult { .. } => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn tool_use_count(&self) -> usize {
        self.content
            .iter()
            .filter(|block| matches!(block, ContentBlock::ToolUse { .. }))
            .count()
    }

    pub fn total_tokens(&self) -> u64 {
        self.usage.as_ref().map(Usage::total).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sub_type_round_trips_through_strings() {
        for raw in [
            "system",
            "summary",
            "hook",
            "microcompaction-boundary",
            "queue-operation",
            "file-history-snapshot",
        ] {
            let sub_type = SubType::parse(raw);
            assert!(sub_type.is_internal(), "{raw} should be internal");
            assert_eq!(sub_type.as_str(), raw);
        }

        let other = SubType::parse("compact_boundary");
        assert_eq!(other, SubType::Other("compact_boundary".to_string()));
        assert!(!other.is_internal());
    }

    #[test]
    fn test_serialization() {
        let message = Message::user("Hello")
            .with_sub_type(SubType::Summary)
            .with_timestamp(Timestamp::from_millis(1_700_000_000_000));

        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["role"], "user");
        assert_eq!(json["sub_type"], "summary");
        assert_eq!(json["timestamp"], json!(1_700_000_000_000i64));

        let back: Message = serde_json::from_value(json).unwrap();
        assert_eq!(back, message);
    }

    #[test]
    fn test_text_skips_non_text_blocks() {
        let message = Message::new(
            Role::Assistant,
            vec![
                ContentBlock::text("first"),
                ContentBlock::tool_use("t1", "bash", json!({"command": "ls"})),
                ContentBlock::text("second"),
            ],
        );
        assert_eq!(message.text(), "first\nsecond");
        assert_eq!(message.tool_use_count(), 1);
    }
}
