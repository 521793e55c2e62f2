//! Terse constructors for hand-written conversations.
//!
//! ```
//! use roundtrace_testing::builders::*;
//!
//! let messages = vec![
//!     at(1_000, prompt("list files")),
//!     at(2_000, call("t1", "Bash", serde_json::json!({"command": "ls"}))),
//!     at(2_400, result("t1", "Cargo.toml")),
//! ];
//! assert_eq!(messages.len(), 3);
//! ```

use roundtrace_types::{ContentBlock, Message, Role, SubType, Timestamp, Usage};
use serde_json::Value;

pub fn prompt(text: &str) -> Message {
    Message::user(text)
}

pub fn reply(text: &str) -> Message {
    Message::assistant(text)
}

/// Internal user-role message (summary, hook, ...)
pub fn internal(sub_type: SubType, text: &str) -> Message {
    Message::user(text).with_sub_type(sub_type)
}

pub fn call(id: &str, name: &str, input: Value) -> Message {
    Message::new(Role::Assistant, vec![ContentBlock::tool_use(id, name, input)])
}

pub fn result(id: &str, output: &str) -> Message {
    Message::new(
        Role::User,
        vec![ContentBlock::tool_result(id, Value::String(output.to_string()), false)],
    )
}

pub fn error_result(id: &str, output: &str) -> Message {
    Message::new(
        Role::User,
        vec![ContentBlock::tool_result(id, Value::String(output.to_string()), true)],
    )
}

pub fn at(millis: i64, message: Message) -> Message {
    message.with_timestamp(Timestamp::from_millis(millis))
}

pub fn billed(input: u64, output: u64, cost_usd: f64, message: Message) -> Message {
    message.with_usage(Usage::new(input, output)).with_cost(cost_usd)
}
