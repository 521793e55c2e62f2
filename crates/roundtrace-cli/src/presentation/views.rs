//! Serializable view models: what `--format json` prints and what the text
//! renderers read. Built from engine types, never from raw log records.

use chrono::SecondsFormat;
use roundtrace_engine::{
    CorrelationReport, CorrelationWindow, InvocationStatus, Round, RoundStats, Session,
    SessionStats, ToolInvocation, extract_images, find_image_references, resolve_image,
    tool_summary, truncate_preview,
};
use roundtrace_types::{DecodeIssue, Timestamp};
use serde::Serialize;

pub fn iso_timestamp(ts: Timestamp) -> Option<String> {
    ts.to_datetime()
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundRow {
    pub index: usize,
    pub offset: usize,
    pub timestamp: Option<String>,
    pub prompt: String,
    pub message_count: usize,
    pub tokens: u64,
    pub cost_usd: f64,
    pub tool_calls: usize,
    pub image_count: usize,
}

impl RoundRow {
    pub fn from_round(round: &Round, preview_chars: usize) -> Self {
        Self {
            index: round.index,
            offset: round.offset,
            timestamp: iso_timestamp(round.timestamp),
            prompt: truncate_preview(&round.prompt_text(), preview_chars),
            message_count: round.message_count(),
            tokens: round.tokens,
            cost_usd: round.cost_usd,
            tool_calls: round.tool_call_count,
            image_count: extract_images(round.messages()).len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundsView {
    pub project_id: String,
    pub session_id: String,
    pub preamble: usize,
    pub rounds: Vec<RoundRow>,
}

impl RoundsView {
    pub fn from_session(session: &Session, preview_chars: usize) -> Self {
        Self {
            project_id: session.project_id.clone(),
            session_id: session.session_id.clone(),
            preamble: session.preamble_len,
            rounds: session
                .rounds
                .iter()
                .map(|round| RoundRow::from_round(round, preview_chars))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolRow {
    pub sequence: usize,
    pub round: Option<usize>,
    pub id: String,
    pub name: String,
    pub summary: String,
    pub status: InvocationStatus,
    pub duration_ms: Option<u64>,
    pub output: Option<String>,
}

impl ToolRow {
    pub fn from_invocation(
        invocation: &ToolInvocation,
        round: Option<usize>,
        preview_chars: usize,
    ) -> Self {
        Self {
            sequence: invocation.sequence_index,
            round,
            id: invocation.id.clone(),
            name: invocation.name.clone(),
            summary: tool_summary(&invocation.input),
            status: invocation.status(),
            duration_ms: invocation.duration_ms,
            output: invocation
                .output_text()
                .map(|text| truncate_preview(&text, preview_chars)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolsView {
    pub window: CorrelationWindow,
    pub round: Option<usize>,
    pub invocations: Vec<ToolRow>,
    pub report: CorrelationReport,
}

fn round_of(session: &Session, message_index: usize) -> Option<usize> {
    session
        .rounds
        .iter()
        .find(|r| (r.offset..r.end_offset()).contains(&message_index))
        .map(|r| r.index)
}

fn merge_reports(a: CorrelationReport, b: CorrelationReport) -> CorrelationReport {
    CorrelationReport {
        orphan_results: a.orphan_results + b.orphan_results,
        duplicate_results: a.duplicate_results + b.duplicate_results,
        reused_ids: a.reused_ids + b.reused_ids,
        skipped_blocks: a.skipped_blocks + b.skipped_blocks,
    }
}

impl ToolsView {
    /// `round` must be a valid round index when given
    pub fn from_session(
        session: &Session,
        round: Option<usize>,
        window: CorrelationWindow,
        preview_chars: usize,
    ) -> Self {
        let (invocations, report) = match (window, round) {
            (CorrelationWindow::Session, Some(index)) => (
                session
                    .invocations_in_round(index)
                    .into_iter()
                    .map(|inv| ToolRow::from_invocation(inv, Some(index), preview_chars))
                    .collect(),
                session.correlation,
            ),
            (CorrelationWindow::Session, None) => (
                session
                    .invocations
                    .iter()
                    .map(|inv| {
                        let round = round_of(session, inv.call_message_index);
                        ToolRow::from_invocation(inv, round, preview_chars)
                    })
                    .collect(),
                session.correlation,
            ),
            (CorrelationWindow::Round, Some(index)) => {
                let correlation = session.round_correlation(index);
                (
                    correlation
                        .invocations
                        .iter()
                        .map(|inv| ToolRow::from_invocation(inv, Some(index), preview_chars))
                        .collect(),
                    correlation.report,
                )
            }
            (CorrelationWindow::Round, None) => {
                let mut rows = Vec::new();
                let mut report = CorrelationReport::default();
                for index in 0..session.rounds.len() {
                    let correlation = session.round_correlation(index);
                    rows.extend(
                        correlation
                            .invocations
                            .iter()
                            .map(|inv| ToolRow::from_invocation(inv, Some(index), preview_chars)),
                    );
                    report = merge_reports(report, correlation.report);
                }
                (rows, report)
            }
        };

        Self {
            window,
            round,
            invocations,
            report,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsView {
    pub session: SessionStats,
    pub rounds: Vec<RoundStats>,
}

impl StatsView {
    pub fn from_session(session: &Session, window: CorrelationWindow) -> Self {
        Self {
            session: session.stats.clone(),
            rounds: (0..session.rounds.len())
                .filter_map(|index| session.round_stats(index, window))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageRow {
    pub number: usize,
    pub media_type: String,
    pub byte_len: Option<usize>,
    pub message_index: usize,
    pub block_index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceRow {
    /// Message position within the round
    pub message_index: usize,
    pub number: usize,
    pub resolved: bool,
    pub media_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImagesView {
    pub round: usize,
    pub images: Vec<ImageRow>,
    pub references: Vec<ReferenceRow>,
}

impl ImagesView {
    /// `index` must be a valid round index
    pub fn from_session(session: &Session, index: usize) -> Self {
        let images = session.round_images(index);

        let mut references = Vec::new();
        if let Some(round) = session.round(index) {
            for (message_index, message) in round.messages().enumerate() {
                for reference in find_image_references(&message.text()) {
                    let image = resolve_image(&images, reference.number);
                    references.push(ReferenceRow {
                        message_index,
                        number: reference.number,
                        resolved: image.is_some(),
                        media_type: image.map(|img| img.media_type.clone()),
                    });
                }
            }
        }

        Self {
            round: index,
            images: images
                .into_iter()
                .map(|img| ImageRow {
                    number: img.number,
                    media_type: img.media_type,
                    byte_len: img.byte_len,
                    message_index: img.message_index,
                    block_index: img.block_index,
                })
                .collect(),
            references,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IssuesView {
    pub messages: usize,
    pub issues: Vec<DecodeIssue>,
}
