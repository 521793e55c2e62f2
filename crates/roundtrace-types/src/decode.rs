//! Tolerant decoder from loosely-typed log records to [`Message`]s.
//!
//! Two record shapes are accepted:
//! - flat: `{role, subType?, timestamp, content, usage?, cost_usd?, model?}`
//! - envelope: `{type, uuid, timestamp, costUSD?, isMeta?, message: {role, content, usage?, model?}}`
//!
//! A record that fails validation is skipped and reported; a content block that
//! fails validation is dropped from its message and reported. Neither fails the log.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{MalformedInput, Result};
use crate::event::{ContentBlock, Message, Role, SubType, Usage};
use crate::timestamp::normalize_timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// Line or document is not JSON
    InvalidJson,
    /// Record failed validation and was skipped
    MalformedRecord,
    /// Envelope record type that carries no conversation content (e.g. progress)
    UnsupportedRecord,
    /// Content block failed validation and was dropped
    MalformedBlock,
    /// Content block of a kind outside the model (e.g. thinking)
    UnsupportedBlock,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodeIssue {
    /// Zero-based record position (line index for JSONL input)
    pub record: usize,
    pub kind: IssueKind,
    pub field: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DecodeOutcome {
    pub messages: Vec<Message>,
    pub issues: Vec<DecodeIssue>,
}

impl DecodeOutcome {
    fn accept(&mut self, record: usize, value: &Value) {
        let mut dropped = Vec::new();
        match decode_record(value, &mut dropped) {
            Ok(message) => {
                self.messages.push(message);
                for rejected in dropped {
                    self.reject(record, rejected);
                }
            }
            Err(rejected) => self.reject(record, rejected),
        }
    }

    fn reject(&mut self, record: usize, rejected: Rejected) {
        tracing::debug!(
            record,
            kind = ?rejected.kind,
            field = %rejected.input.field,
            reason = %rejected.input.reason,
            "skipping malformed input"
        );
        self.issues.push(DecodeIssue {
            record,
            kind: rejected.kind,
            field: rejected.input.field,
            reason: rejected.input.reason,
        });
    }
}

/// Decode a single record.
///
/// Invalid content blocks are dropped (and logged); only record-level
/// problems fail.
pub fn decode_message(value: &Value) -> Result<Message> {
    let mut dropped = Vec::new();
    let message = decode_record(value, &mut dropped).map_err(|rejected| rejected.input)?;
    for rejected in dropped {
        tracing::debug!(
            field = %rejected.input.field,
            reason = %rejected.input.reason,
            "dropped content block"
        );
    }
    Ok(message)
}

/// Decode a sequence of records, skipping the ones that fail
pub fn decode_messages(values: &[Value]) -> DecodeOutcome {
    let mut outcome = DecodeOutcome::default();
    for (record, value) in values.iter().enumerate() {
        outcome.accept(record, value);
    }
    outcome
}

/// Decode JSON Lines text; blank lines are ignored
pub fn decode_jsonl(text: &str) -> DecodeOutcome {
    let mut outcome = DecodeOutcome::default();
    for (record, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<Value>(line) {
            Ok(value) => outcome.accept(record, &value),
            Err(err) => outcome.reject(
                record,
                Rejected {
                    kind: IssueKind::InvalidJson,
                    input: MalformedInput::new("$", err.to_string()),
                },
            ),
        }
    }
    outcome
}

/// Decode either a JSON array of records or JSON Lines
pub fn decode_log(text: &str) -> DecodeOutcome {
    if text.trim_start().starts_with('[')
        && let Ok(values) = serde_json::from_str::<Vec<Value>>(text)
    {
        return decode_messages(&values);
    }
    decode_jsonl(text)
}

struct Rejected {
    kind: IssueKind,
    input: MalformedInput,
}

impl Rejected {
    fn record(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            kind: IssueKind::MalformedRecord,
            input: MalformedInput::new(field, reason),
        }
    }

    fn block(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            kind: IssueKind::MalformedBlock,
            input: MalformedInput::new(field, reason),
        }
    }
}

fn decode_record(
    value: &Value,
    dropped: &mut Vec<Rejected>,
) -> std::result::Result<Message, Rejected> {
    let obj = value
        .as_object()
        .ok_or_else(|| Rejected::record("$", "expected a JSON object"))?;
    let inner = obj.get("message").and_then(Value::as_object);

    let (role, envelope_sub_type) = resolve_role(obj, inner)?;
    let sub_type = match explicit_sub_type(obj)? {
        Some(sub_type) => Some(sub_type),
        None => envelope_sub_type.or_else(|| meta_sub_type(obj, role)),
    };

    let timestamp = obj
        .get("timestamp")
        .map(normalize_timestamp)
        .unwrap_or_default();

    let content = decode_content(obj, inner, dropped)?;

    let usage = inner
        .and_then(|m| m.get("usage"))
        .or_else(|| obj.get("usage"))
        .and_then(decode_usage);

    let cost_usd = ["cost_usd", "costUSD", "costUsd"]
        .iter()
        .find_map(|key| obj.get(*key))
        .and_then(Value::as_f64);

    let model = inner
        .and_then(|m| m.get("model"))
        .or_else(|| obj.get("model"))
        .and_then(Value::as_str)
        .map(str::to_string);

    let id = obj
        .get("uuid")
        .or_else(|| obj.get("id"))
        .and_then(Value::as_str)
        .map(str::to_string);

    Ok(Message {
        id,
        role,
        sub_type,
        timestamp,
        content,
        usage,
        cost_usd,
        model,
    })
}

/// Role from `message.role`, `role`, or the envelope `type`.
///
/// Envelope types naming a bookkeeping marker (`summary`, `system`, ...) become
/// user-role messages carrying that marker so they never open a round.
fn resolve_role(
    obj: &Map<String, Value>,
    inner: Option<&Map<String, Value>>,
) -> std::result::Result<(Role, Option<SubType>), Rejected> {
    let record_type = obj.get("type").and_then(Value::as_str);

    if let Some(kind) = record_type
        && Role::parse(kind).is_none()
    {
        let sub_type = SubType::parse(kind);
        if sub_type.is_internal() {
            return Ok((Role::User, Some(sub_type)));
        }
        return Err(Rejected {
            kind: IssueKind::UnsupportedRecord,
            input: MalformedInput::new("type", format!("unsupported record type `{}`", kind)),
        });
    }

    let declared = inner
        .and_then(|m| m.get("role"))
        .map(|v| (v, "message.role"))
        .or_else(|| obj.get("role").map(|v| (v, "role")));

    let role = match declared {
        Some((value, field)) => {
            let raw = value
                .as_str()
                .ok_or_else(|| Rejected::record(field, "expected a string"))?;
            Role::parse(raw)
                .ok_or_else(|| Rejected::record(field, format!("unknown role `{}`", raw)))?
        }
        None => record_type
            .and_then(Role::parse)
            .ok_or_else(|| Rejected::record("role", "missing"))?,
    };

    Ok((role, None))
}

fn explicit_sub_type(
    obj: &Map<String, Value>,
) -> std::result::Result<Option<SubType>, Rejected> {
    for key in ["subType", "sub_type"] {
        match obj.get(key) {
            None | Some(Value::Null) => continue,
            Some(Value::String(s)) => return Ok(Some(SubType::parse(s))),
            Some(_) => return Err(Rejected::record(key, "expected a string")),
        }
    }
    Ok(None)
}

/// `isMeta` user records are injected by the assistant, not typed by the user.
fn meta_sub_type(obj: &Map<String, Value>, role: Role) -> Option<SubType> {
    let is_meta = obj.get("isMeta").and_then(Value::as_bool).unwrap_or(false);
    (is_meta && role == Role::User).then_some(SubType::System)
}

fn decode_content(
    obj: &Map<String, Value>,
    inner: Option<&Map<String, Value>>,
    dropped: &mut Vec<Rejected>,
) -> std::result::Result<Vec<ContentBlock>, Rejected> {
    let (raw, prefix) = match inner.and_then(|m| m.get("content")) {
        Some(value) => (Some(value), "message.content"),
        None => (obj.get("content").or_else(|| obj.get("summary")), "content"),
    };

    match raw {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::String(text)) => Ok(vec![ContentBlock::text(text.clone())]),
        Some(Value::Array(items)) => {
            let mut blocks = Vec::with_capacity(items.len());
            for (idx, item) in items.iter().enumerate() {
                match decode_block(item) {
                    Ok(block) => blocks.push(block),
                    Err(rejected) => {
                        let position = format!("[{}]", idx);
                        let input = if rejected.input.field.is_empty() {
                            MalformedInput::new(position, rejected.input.reason)
                        } else {
                            rejected.input.nested(&position)
                        };
                        dropped.push(Rejected {
                            kind: rejected.kind,
                            input: input.nested(prefix),
                        });
                    }
                }
            }
            Ok(blocks)
        }
        Some(_) => Err(Rejected::record(prefix, "expected a string or an array")),
    }
}

fn decode_block(value: &Value) -> std::result::Result<ContentBlock, Rejected> {
    let obj = value
        .as_object()
        .ok_or_else(|| Rejected::block("", "expected a JSON object"))?;
    let kind = obj
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| Rejected::block("type", "missing block type"))?;

    match kind {
        "text" => Ok(ContentBlock::Text {
            text: required_str(obj, "text", "")?,
        }),
        "image" => decode_image(obj),
        "tool_use" => Ok(ContentBlock::ToolUse {
            id: non_empty_str(obj, "id")?,
            name: non_empty_str(obj, "name")?,
            input: obj.get("input").cloned().unwrap_or(Value::Null),
        }),
        "tool_result" => Ok(ContentBlock::ToolResult {
            tool_use_id: non_empty_str(obj, "tool_use_id")?,
            content: obj.get("content").cloned().unwrap_or(Value::Null),
            is_error: obj
                .get("is_error")
                .and_then(Value::as_bool)
                .unwrap_or(false),
        }),
        other => Err(Rejected {
            kind: IssueKind::UnsupportedBlock,
            input: MalformedInput::new("type", format!("unsupported block type `{}`", other)),
        }),
    }
}

fn decode_image(obj: &Map<String, Value>) -> std::result::Result<ContentBlock, Rejected> {
    let (holder, prefix) = match obj.get("source").and_then(Value::as_object) {
        Some(source) => (source, "source."),
        None => (obj, ""),
    };
    Ok(ContentBlock::Image {
        media_type: required_str(holder, "media_type", prefix)?,
        data: required_str(holder, "data", prefix)?,
    })
}

fn required_str(
    obj: &Map<String, Value>,
    key: &str,
    prefix: &str,
) -> std::result::Result<String, Rejected> {
    match obj.get(key) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(Rejected::block(
            format!("{}{}", prefix, key),
            "expected a string",
        )),
        None => Err(Rejected::block(format!("{}{}", prefix, key), "missing")),
    }
}

fn non_empty_str(obj: &Map<String, Value>, key: &str) -> std::result::Result<String, Rejected> {
    let value = required_str(obj, key, "")?;
    if value.trim().is_empty() {
        return Err(Rejected::block(key, "empty"));
    }
    Ok(value)
}

fn decode_usage(value: &Value) -> Option<Usage> {
    let obj = value.as_object()?;
    let count = |key: &str| obj.get(key).and_then(Value::as_u64);
    Some(Usage {
        input_tokens: count("input_tokens").unwrap_or(0),
        output_tokens: count("output_tokens").unwrap_or(0),
        cache_read_input_tokens: count("cache_read_input_tokens"),
        cache_creation_input_tokens: count("cache_creation_input_tokens"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Timestamp;
    use serde_json::json;

    #[test]
    fn test_flat_shape() {
        let message = decode_message(&json!({
            "role": "assistant",
            "timestamp": 1700000000,
            "content": [
                {"type": "text", "text": "reading"},
                {"type": "tool_use", "id": "a1", "name": "read", "input": {"file_path": "a.rs"}}
            ],
            "usage": {"input_tokens": 10, "output_tokens": 5, "cache_read_input_tokens": 100},
            "cost_usd": 0.01,
            "model": "claude-sonnet"
        }))
        .unwrap();

        assert_eq!(message.role, Role::Assistant);
        assert_eq!(message.timestamp, Timestamp::from_millis(1_700_000_000_000));
        assert_eq!(message.content.len(), 2);
        assert_eq!(message.total_tokens(), 15);
        assert_eq!(message.usage.unwrap().cache_read_input_tokens, Some(100));
        assert_eq!(message.cost_usd, Some(0.01));
        assert_eq!(message.model.as_deref(), Some("claude-sonnet"));
    }

    #[test]
    fn test_envelope_shape() {
        let message = decode_message(&json!({
            "type": "user",
            "uuid": "u-1",
            "sessionId": "s-1",
            "timestamp": "2023-11-14T22:13:20.000Z",
            "message": {
                "role": "user",
                "content": [{"type": "tool_result", "tool_use_id": "a1", "content": "ok"}]
            }
        }))
        .unwrap();

        assert_eq!(message.id.as_deref(), Some("u-1"));
        assert_eq!(message.role, Role::User);
        assert_eq!(message.timestamp.as_millis(), 1_700_000_000_000);
        assert!(matches!(
            &message.content[0],
            ContentBlock::ToolResult { tool_use_id, is_error: false, .. } if tool_use_id == "a1"
        ));
    }

    #[test]
    fn test_string_content_becomes_text_block() {
        let message = decode_message(&json!({"role": "user", "content": "hi"})).unwrap();
        assert_eq!(message.content, vec![ContentBlock::text("hi")]);
    }

    #[test]
    fn test_summary_record_maps_to_sub_type() {
        let message = decode_message(&json!({
            "type": "summary",
            "summary": "Refactored the parser",
            "leafUuid": "x"
        }))
        .unwrap();

        assert_eq!(message.role, Role::User);
        assert_eq!(message.sub_type, Some(SubType::Summary));
        assert_eq!(message.text(), "Refactored the parser");
    }

    #[test]
    fn test_meta_user_record_is_system() {
        let message = decode_message(&json!({
            "type": "user",
            "isMeta": true,
            "message": {"role": "user", "content": "<local-command-stdout></local-command-stdout>"}
        }))
        .unwrap();
        assert_eq!(message.sub_type, Some(SubType::System));
    }

    #[test]
    fn test_explicit_sub_type_wins() {
        let message = decode_message(&json!({
            "role": "user",
            "subType": "hook",
            "isMeta": true,
            "content": "hook output"
        }))
        .unwrap();
        assert_eq!(message.sub_type, Some(SubType::Hook));
    }

    #[test]
    fn test_missing_role_names_field() {
        let err = decode_message(&json!({"content": "hi"})).unwrap_err();
        assert_eq!(err.to_string(), "Malformed input: malformed field `role`: missing");
    }

    #[test]
    fn test_unknown_role_names_field() {
        let err = decode_message(&json!({"message": {"role": "tool", "content": []}})).unwrap_err();
        assert!(err.to_string().contains("`message.role`"));
    }

    #[test]
    fn test_bad_block_is_dropped_not_fatal() {
        let outcome = decode_messages(&[json!({
            "role": "assistant",
            "content": [
                {"type": "tool_use", "name": "read"},
                {"type": "thinking", "thinking": "hmm"},
                {"type": "text", "text": "done"}
            ]
        })]);

        assert_eq!(outcome.messages.len(), 1);
        assert_eq!(outcome.messages[0].content, vec![ContentBlock::text("done")]);
        assert_eq!(outcome.issues.len(), 2);
        assert_eq!(outcome.issues[0].kind, IssueKind::MalformedBlock);
        assert_eq!(outcome.issues[0].field, "content[0].id");
        assert_eq!(outcome.issues[1].kind, IssueKind::UnsupportedBlock);
        assert_eq!(outcome.issues[1].field, "content[1].type");
    }

    #[test]
    fn test_image_source_fields() {
        let outcome = decode_messages(&[json!({
            "role": "user",
            "content": [
                {"type": "image", "source": {"type": "base64", "media_type": "image/png", "data": "iVBORw0KGgo="}},
                {"type": "image", "source": {"type": "base64", "media_type": "image/png"}},
                "not an object"
            ]
        })]);

        assert_eq!(outcome.messages[0].content.len(), 1);
        assert_eq!(outcome.issues[0].field, "content[1].source.data");
        assert_eq!(outcome.issues[1].field, "content[2]");
    }

    #[test]
    fn test_one_bad_record_does_not_blank_the_log() {
        let outcome = decode_messages(&[
            json!({"role": "user", "content": "first"}),
            json!("garbage"),
            json!({"role": "user", "content": 42}),
            json!({"type": "progress", "data": {}}),
            json!({"role": "assistant", "content": "second"}),
        ]);

        assert_eq!(outcome.messages.len(), 2);
        let kinds: Vec<_> = outcome.issues.iter().map(|i| (i.record, i.kind)).collect();
        assert_eq!(
            kinds,
            vec![
                (1, IssueKind::MalformedRecord),
                (2, IssueKind::MalformedRecord),
                (3, IssueKind::UnsupportedRecord),
            ]
        );
    }

    #[test]
    fn test_jsonl_reports_invalid_lines() {
        let text = "{\"role\":\"user\",\"content\":\"hi\"}\n\n{not json\n{\"role\":\"assistant\",\"content\":\"hello\"}\n";
        let outcome = decode_jsonl(text);
        assert_eq!(outcome.messages.len(), 2);
        assert_eq!(outcome.issues.len(), 1);
        assert_eq!(outcome.issues[0].record, 2);
        assert_eq!(outcome.issues[0].kind, IssueKind::InvalidJson);
    }

    #[test]
    fn test_decode_log_detects_array() {
        let text = r#"[{"role":"user","content":"hi"},{"role":"assistant","content":"hello"}]"#;
        let outcome = decode_log(text);
        assert_eq!(outcome.messages.len(), 2);
        assert!(outcome.issues.is_empty());
    }

    #[test]
    fn test_unparsable_timestamp_is_not_malformed() {
        let message =
            decode_message(&json!({"role": "user", "timestamp": "soon", "content": "hi"})).unwrap();
        assert!(!message.timestamp.is_known());
    }
}
