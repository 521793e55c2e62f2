//! Collaborator interfaces the engine calls but never implements.
//!
//! File snapshots, the clipboard and the summary backend live outside this
//! crate; the engine only derives what to ask for and hands it over.

use roundtrace_types::ContentBlock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::session::Round;
use crate::summary::{SummaryPayload, round_transcript, summary_payload};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortError {
    /// Collaborator not configured or not reachable
    Unavailable(String),
    /// Collaborator reported a failure
    Failed(String),
}

impl fmt::Display for PortError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortError::Unavailable(msg) => write!(f, "Collaborator unavailable: {}", msg),
            PortError::Failed(msg) => write!(f, "Collaborator failed: {}", msg),
        }
    }
}

impl std::error::Error for PortError {}

/// Identifies the content of a file as it was right after a given message
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SnapshotKey {
    pub session_id: String,
    pub message_id: String,
    pub file_path: String,
}

pub trait SnapshotSource {
    /// `Ok(None)` when no snapshot exists for the key
    fn fetch_snapshot(&self, key: &SnapshotKey) -> Result<Option<String>, PortError>;
}

pub trait ClipboardSink {
    fn write_text(&mut self, text: &str) -> Result<(), PortError>;
}

pub trait SummaryObserver {
    fn on_chunk(&mut self, chunk: &str);
    fn on_complete(&mut self);
    fn on_error(&mut self, error: PortError);
}

pub trait SummaryStreamer {
    /// Stream a summary of `payload`; every outcome is reported through `observer`
    fn stream_summary(&mut self, payload: &SummaryPayload, observer: &mut dyn SummaryObserver);
}

const PATH_KEYS: [&str; 3] = ["file_path", "path", "notebook_path"];

/// Files touched by the round's tool calls, keyed by the carrying message.
///
/// Messages without an id cannot be looked up and are skipped.
pub fn snapshot_keys(session_id: &str, round: &Round) -> Vec<SnapshotKey> {
    let mut keys: Vec<SnapshotKey> = Vec::new();

    for message in &round.assistant_messages {
        for block in &message.content {
            let ContentBlock::ToolUse { input, .. } = block else {
                continue;
            };
            let Some(file_path) = PATH_KEYS
                .iter()
                .find_map(|key| input.get(*key).and_then(Value::as_str))
            else {
                continue;
            };
            let Some(message_id) = &message.id else {
                tracing::trace!(file_path, "tool call message has no id; no snapshot key");
                continue;
            };

            let key = SnapshotKey {
                session_id: session_id.to_string(),
                message_id: message_id.clone(),
                file_path: file_path.to_string(),
            };
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
    }

    keys
}

/// Fetch every snapshot the round refers to; missing snapshots are left out
pub fn fetch_round_snapshots(
    source: &dyn SnapshotSource,
    session_id: &str,
    round: &Round,
) -> Result<Vec<(SnapshotKey, String)>, PortError> {
    let mut snapshots = Vec::new();
    for key in snapshot_keys(session_id, round) {
        if let Some(content) = source.fetch_snapshot(&key)? {
            snapshots.push((key, content));
        }
    }
    Ok(snapshots)
}

/// Write the round transcript to the clipboard
pub fn copy_round(round: &Round, sink: &mut dyn ClipboardSink) -> Result<(), PortError> {
    sink.write_text(&round_transcript(round))
}

pub fn request_round_summary(
    round: &Round,
    streamer: &mut dyn SummaryStreamer,
    observer: &mut dyn SummaryObserver,
) {
    let payload = summary_payload(round);
    tracing::debug!(round = round.index, tools = payload.tool_names.len(), "requesting round summary");
    streamer.stream_summary(&payload, observer);
}

/// Observer that accumulates the streamed text
#[derive(Debug, Default)]
pub struct SummaryBuffer {
    pub text: String,
    pub completed: bool,
    pub error: Option<PortError>,
}

impl SummaryObserver for SummaryBuffer {
    fn on_chunk(&mut self, chunk: &str) {
        self.text.push_str(chunk);
    }

    fn on_complete(&mut self) {
        self.completed = true;
    }

    fn on_error(&mut self, error: PortError) {
        self.error = Some(error);
    }
}
