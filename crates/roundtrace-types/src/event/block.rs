use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Content block variants
///
/// Closed set: a new block kind is a compile-time change at every match site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
#[serde(rename_all = "snake_case")]
pub enum ContentBlock {
    /// Plain text authored by the user or the assistant
    Text { text: String },

    /// Inline image, base64 encoded
    Image { media_type: String, data: String },

    /// Tool execution request (Action Request)
    ToolUse {
        id: String,
        name: String,
        #[serde(default)]
        input: Value,
    },

    /// Tool execution result (Action Result)
    ///
    /// `content` is kept as delivered: a string, or an array of nested blocks.
    ToolResult {
        tool_use_id: String,
        #[serde(default)]
        content: Value,
        #[serde(default)]
        is_error: bool,
    },
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        ContentBlock::Text { text: text.into() }
    }

    pub fn image(media_type: impl Into<String>, data: impl Into<String>) -> Self {
        ContentBlock::Image {
            media_type: media_type.into(),
            data: data.into(),
        }
    }

    pub fn tool_use(id: impl Into<String>, name: impl Into<String>, input: Value) -> Self {
        ContentBlock::ToolUse {
            id: id.into(),
            name: name.into(),
            input,
        }
    }

    pub fn tool_result(tool_use_id: impl Into<String>, content: Value, is_error: bool) -> Self {
        ContentBlock::ToolResult {
            tool_use_id: tool_use_id.into(),
            content,
            is_error,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ContentBlock::Text { .. } => "text",
            ContentBlock::Image { .. } => "image",
            ContentBlock::ToolUse { .. } => "tool_use",
            ContentBlock::ToolResult { .. } => "tool_result",
        }
    }
}

/// Flatten tool result content into display text.
///
/// Strings pass through; arrays keep their text parts joined by newlines and
/// render nested images as `[image]`; anything else is rendered as JSON.
pub fn flatten_result_content(content: &Value) -> String {
    match content {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item.get("type").and_then(Value::as_str) {
                Some("text") => item.get("text").and_then(Value::as_str).map(str::to_string),
                Some("image") => Some("[image]".to_string()),
                _ => item.as_str().map(str::to_string),
            })
            .collect::<Vec<_>>()
            .join("\n"),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serialization_is_tagged() {
        let block = ContentBlock::tool_use("a1", "read", json!({"file_path": "src/main.rs"}));
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json["type"], "tool_use");
        assert_eq!(json["id"], "a1");

        let back: ContentBlock = serde_json::from_value(json).unwrap();
        assert_eq!(back, block);
    }

    #[test]
    fn test_flatten_string_content() {
        assert_eq!(flatten_result_content(&json!("ok")), "ok");
        assert_eq!(flatten_result_content(&Value::Null), "");
    }

    #[test]
    fn test_flatten_array_content() {
        let content = json!([
            {"type": "text", "text": "line one"},
            {"type": "image", "source": {"media_type": "image/png", "data": "AAAA"}},
            {"type": "text", "text": "line two"}
        ]);
        assert_eq!(
            flatten_result_content(&content),
            "line one\n[image]\nline two"
        );
    }

    #[test]
    fn test_flatten_other_json() {
        assert_eq!(flatten_result_content(&json!({"exit": 0})), r#"{"exit":0}"#);
    }
}
