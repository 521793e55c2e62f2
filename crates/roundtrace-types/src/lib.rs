pub mod decode;
pub mod error;
pub mod event;
pub mod timestamp;

pub use decode::{
    DecodeIssue, DecodeOutcome, IssueKind, decode_jsonl, decode_log, decode_message,
    decode_messages,
};
pub use error::{Error, MalformedInput, Result};
pub use event::*;
pub use timestamp::{Timestamp, normalize_timestamp, parse_timestamp_str};
