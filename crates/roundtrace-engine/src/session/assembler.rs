use roundtrace_types::{DecodeIssue, Message, decode_log};
use serde::{Deserialize, Serialize};

use super::segmenter::segment;
use super::stats::{calculate_round_stats, calculate_session_stats};
use super::types::*;
use crate::correlation::{Correlation, ToolInvocation, correlate_with_report};
use crate::images::{ExtractedImage, extract_images};

/// Build the full session view: rounds, session-wide correlation and totals.
///
/// Never fails; anomalies end up in `correlation` and the preamble.
pub fn assemble_session(
    project_id: impl Into<String>,
    session_id: impl Into<String>,
    messages: Vec<Message>,
) -> Session {
    let segmentation = segment(&messages);
    let preamble_len = segmentation.preamble.len();
    let Correlation {
        invocations,
        report,
    } = correlate_with_report(&messages);

    let stats = calculate_session_stats(&messages, preamble_len, &segmentation.rounds, &invocations);

    let session = Session {
        project_id: project_id.into(),
        session_id: session_id.into(),
        messages,
        preamble_len,
        rounds: segmentation.rounds,
        invocations,
        correlation: report,
        stats,
    };

    tracing::debug!(
        session_id = %session.session_id,
        rounds = session.rounds.len(),
        invocations = session.invocations.len(),
        orphans = session.correlation.orphan_results,
        "assembled session"
    );

    session
}

/// Decoded and assembled session, plus what the decoder had to skip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reconstruction {
    pub session: Session,
    pub issues: Vec<DecodeIssue>,
}

/// Decode a JSONL (or JSON array) log and assemble it in one call
pub fn reconstruct_from_jsonl(
    project_id: impl Into<String>,
    session_id: impl Into<String>,
    text: &str,
) -> Reconstruction {
    let outcome = decode_log(text);
    if !outcome.issues.is_empty() {
        tracing::debug!(count = outcome.issues.len(), "log decoded with issues");
    }

    Reconstruction {
        session: assemble_session(project_id, session_id, outcome.messages),
        issues: outcome.issues,
    }
}

impl Session {
    pub fn round(&self, index: usize) -> Option<&Round> {
        self.rounds.get(index)
    }

    /// Messages preceding the first real prompt
    pub fn preamble(&self) -> &[Message] {
        self.messages.get(..self.preamble_len).unwrap_or(&[])
    }

    fn round_window(&self, index: usize) -> Option<&[Message]> {
        let round = self.rounds.get(index)?;
        self.messages.get(round.offset..round.end_offset())
    }

    /// Session-wide invocations whose call happened inside the round
    pub fn invocations_in_round(&self, index: usize) -> Vec<&ToolInvocation> {
        let Some(round) = self.rounds.get(index) else {
            return Vec::new();
        };
        let window = round.offset..round.end_offset();
        self.invocations
            .iter()
            .filter(|inv| window.contains(&inv.call_message_index))
            .collect()
    }

    /// Re-correlate using only the round's messages.
    ///
    /// Results whose call happened in an earlier round become orphans here,
    /// and message indices are relative to the round.
    pub fn round_invocations(&self, index: usize) -> Vec<ToolInvocation> {
        self.round_correlation(index).invocations
    }

    pub fn round_correlation(&self, index: usize) -> Correlation {
        self.round_window(index)
            .map(correlate_with_report)
            .unwrap_or_default()
    }

    pub fn invocations_for(&self, index: usize, window: CorrelationWindow) -> Vec<ToolInvocation> {
        match window {
            CorrelationWindow::Session => self
                .invocations_in_round(index)
                .into_iter()
                .cloned()
                .collect(),
            CorrelationWindow::Round => self.round_invocations(index),
        }
    }

    pub fn round_stats(&self, index: usize, window: CorrelationWindow) -> Option<RoundStats> {
        let round = self.rounds.get(index)?;
        let invocations = self.invocations_for(index, window);
        Some(calculate_round_stats(round, &invocations))
    }

    /// Inline images of a round, numbered for `[Image #N]` resolution
    pub fn round_images(&self, index: usize) -> Vec<ExtractedImage> {
        self.rounds
            .get(index)
            .map(|round| extract_images(round.messages()))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roundtrace_types::{ContentBlock, Role, SubType, Timestamp};
    use serde_json::json;

    fn at(millis: i64, message: Message) -> Message {
        message.with_timestamp(Timestamp::from_millis(millis))
    }

    fn call(id: &str) -> Message {
        Message::new(
            Role::Assistant,
            vec![ContentBlock::tool_use(id, "bash", json!({"command": "ls"}))],
        )
    }

    fn result(id: &str) -> Message {
        Message::new(
            Role::User,
            vec![ContentBlock::tool_result(id, json!("ok"), false)],
        )
    }

    #[test]
    fn test_empty_session() {
        let session = assemble_session("p", "s", Vec::new());
        assert!(session.rounds.is_empty());
        assert!(session.invocations.is_empty());
        assert!(session.preamble().is_empty());
        assert!(session.round(0).is_none());
        assert!(session.round_invocations(0).is_empty());
        assert!(session.round_images(3).is_empty());
    }

    #[test]
    fn test_cross_round_result_depends_on_window() {
        let messages = vec![
            Message::user("").with_sub_type(SubType::FileHistorySnapshot),
            at(1_000, Message::user("start")),
            at(2_000, call("t1")),
            at(3_000, Message::user("next")),
            at(4_500, result("t1")),
        ];
        let session = assemble_session("p", "s", messages);

        assert_eq!(session.preamble().len(), 1);
        assert_eq!(session.rounds.len(), 2);

        // session window: matched across the boundary
        let resolved = session.invocations_for(0, CorrelationWindow::Session);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].duration_ms, Some(2_500));
        assert!(session.invocations_in_round(1).is_empty());

        // round window: the call stays pending, the result is an orphan
        let first = session.round_correlation(0);
        assert!(!first.invocations[0].is_resolved());
        let second = session.round_correlation(1);
        assert!(second.invocations.is_empty());
        assert_eq!(second.report.orphan_results, 1);
    }

    #[test]
    fn test_round_stats_by_window() {
        let messages = vec![
            at(1_000, Message::user("go")),
            at(2_000, call("t1")),
            at(2_100, result("t1")),
        ];
        let session = assemble_session("p", "s", messages);

        let stats = session.round_stats(0, CorrelationWindow::Round).unwrap();
        assert_eq!(stats.tools.succeeded, 1);
        assert_eq!(stats.duration_ms, Some(1_100));
        assert!(session.round_stats(1, CorrelationWindow::Session).is_none());
    }

    #[test]
    fn test_reconstruct_reports_issues() {
        let text = r#"{"role":"user","content":"hello"}
not json
{"role":"assistant","content":[{"type":"text","text":"hi"}]}"#;
        let reconstruction = reconstruct_from_jsonl("p", "s", text);

        assert_eq!(reconstruction.session.messages.len(), 2);
        assert_eq!(reconstruction.session.rounds.len(), 1);
        assert_eq!(reconstruction.issues.len(), 1);
        assert_eq!(reconstruction.issues[0].record, 1);
    }

    #[test]
    fn test_oversized_usage_saturates() {
        let text = r#"{"role":"user","content":"go"}
{"role":"assistant","content":"ok","usage":{"input_tokens":18446744073709551615,"output_tokens":1}}
{"role":"assistant","content":"more","usage":{"input_tokens":5,"output_tokens":5}}"#;
        let reconstruction = reconstruct_from_jsonl("p", "s", text);
        let session = &reconstruction.session;

        assert_eq!(session.rounds.len(), 1);
        assert_eq!(session.rounds[0].tokens, u64::MAX);
        let stats = session.round_stats(0, CorrelationWindow::Session).unwrap();
        assert_eq!(stats.tokens.input, u64::MAX);
        assert_eq!(stats.tokens.total(), u64::MAX);
    }

    #[test]
    fn test_preamble_tolerates_inconsistent_length() {
        let mut session = assemble_session("p", "s", vec![Message::user("go")]);
        session.preamble_len = 5;
        assert!(session.preamble().is_empty());
    }
}
