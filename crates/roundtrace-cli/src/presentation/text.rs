use roundtrace_engine::{
    CorrelationWindow, InvocationStatus, format_cost, format_duration_ms, format_tokens,
};
use roundtrace_types::IssueKind;

use super::Painter;
use super::views::{ImagesView, IssuesView, RoundsView, StatsView, ToolsView};

fn plural(count: usize, one: &str, many: &str) -> String {
    format!("{} {}", count, if count == 1 { one } else { many })
}

/// `HH:MM:SS` slice of an RFC 3339 timestamp
fn clock(timestamp: Option<&str>) -> &str {
    timestamp.and_then(|ts| ts.get(11..19)).unwrap_or("--:--:--")
}

fn window_label(window: CorrelationWindow) -> &'static str {
    match window {
        CorrelationWindow::Session => "session",
        CorrelationWindow::Round => "round",
    }
}

fn issue_kind_label(kind: IssueKind) -> &'static str {
    match kind {
        IssueKind::InvalidJson => "invalid_json",
        IssueKind::MalformedRecord => "malformed_record",
        IssueKind::UnsupportedRecord => "unsupported_record",
        IssueKind::MalformedBlock => "malformed_block",
        IssueKind::UnsupportedBlock => "unsupported_block",
    }
}

pub fn render_rounds(view: &RoundsView, p: &Painter) -> String {
    let mut lines = vec![format!(
        "{} {}: {}, {}",
        p.bold("Session"),
        p.accent(&view.session_id),
        plural(view.rounds.len(), "round", "rounds"),
        plural(view.preamble, "preamble message", "preamble messages"),
    )];

    for row in &view.rounds {
        let mut cells = vec![
            p.bold(&format!("#{}", row.index)),
            p.dim(clock(row.timestamp.as_deref())),
            plural(row.message_count, "msg", "msgs"),
            format!("{} tokens", format_tokens(row.tokens)),
            format_cost(row.cost_usd),
            plural(row.tool_calls, "tool", "tools"),
        ];
        if row.image_count > 0 {
            cells.push(plural(row.image_count, "image", "images"));
        }
        cells.push(row.prompt.clone());
        lines.push(cells.join("  "));
    }

    lines.join("\n")
}

pub fn render_tools(view: &ToolsView, p: &Painter) -> String {
    let scope = match view.round {
        Some(index) => format!("round #{}", index),
        None => "all rounds".to_string(),
    };
    let mut lines = vec![format!(
        "{} ({}, {} window): {}",
        p.bold("Tools"),
        scope,
        window_label(view.window),
        plural(view.invocations.len(), "invocation", "invocations"),
    )];

    for row in &view.invocations {
        let status = match row.status {
            InvocationStatus::Succeeded => p.ok("[ok]     "),
            InvocationStatus::Failed => p.error("[failed] "),
            InvocationStatus::Pending => p.warn("[pending]"),
        };
        let round = row
            .round
            .map(|r| format!("r{}", r))
            .unwrap_or_else(|| "--".to_string());

        let mut line = format!(
            "{:>3}  {}  {} {}",
            row.sequence,
            p.dim(&round),
            status,
            p.bold(&row.name)
        );
        if !row.summary.is_empty() {
            line.push(' ');
            line.push_str(&row.summary);
        }
        if let Some(ms) = row.duration_ms {
            line.push_str("  ");
            line.push_str(&p.dim(&format_duration_ms(ms)));
        }
        lines.push(line);
    }

    let report = &view.report;
    if report.orphan_results > 0 {
        lines.push(p.warn(&format!(
            "{} without a matching call",
            plural(report.orphan_results, "result", "results")
        )));
    }
    if report.duplicate_results > 0 {
        lines.push(p.warn(&format!(
            "{} ignored (already resolved)",
            plural(report.duplicate_results, "repeated result", "repeated results")
        )));
    }
    if report.reused_ids > 0 {
        lines.push(p.warn(&plural(
            report.reused_ids,
            "reused call id",
            "reused call ids",
        )));
    }

    lines.join("\n")
}

pub fn render_stats(view: &StatsView, p: &Painter) -> String {
    let s = &view.session;
    let mut lines = vec![
        format!(
            "{} {}, {} ({} preamble)",
            p.bold("Session:"),
            plural(s.round_count, "round", "rounds"),
            plural(s.message_count, "message", "messages"),
            s.preamble_count
        ),
        format!(
            "{} {} (in {}, out {}, cache read {}, cache write {})",
            p.bold("Tokens:"),
            format_tokens(s.tokens.total()),
            format_tokens(s.tokens.input),
            format_tokens(s.tokens.output),
            format_tokens(s.tokens.cache_read),
            format_tokens(s.tokens.cache_creation)
        ),
        format!("{} {}", p.bold("Cost:"), format_cost(s.cost_usd)),
        format!(
            "{} {} ({} ok, {} failed, {} pending)",
            p.bold("Tools:"),
            s.tools.total,
            s.tools.succeeded,
            s.tools.failed,
            s.tools.pending
        ),
        format!("{} {}", p.bold("Images:"), s.image_count),
    ];
    if let Some(ms) = s.duration_ms {
        lines.push(format!("{} {}", p.bold("Duration:"), format_duration_ms(ms)));
    }

    for round in &view.rounds {
        let mut line = format!(
            "{}  {} tokens  {}  {}",
            p.bold(&format!("#{}", round.index)),
            format_tokens(round.tokens.total()),
            format_cost(round.cost_usd),
            plural(round.tools.total, "tool", "tools"),
        );
        if round.tools.failed > 0 {
            line.push_str(&format!(" ({} failed)", round.tools.failed));
        }
        if let Some(ms) = round.duration_ms {
            line.push_str("  ");
            line.push_str(&format_duration_ms(ms));
        }
        lines.push(line);
    }

    lines.join("\n")
}

pub fn render_images(view: &ImagesView, p: &Painter) -> String {
    let mut lines = vec![format!(
        "{} #{}: {}",
        p.bold("Round"),
        view.round,
        plural(view.images.len(), "image", "images")
    )];

    for image in &view.images {
        let size = match image.byte_len {
            Some(len) => plural(len, "byte", "bytes"),
            None => p.warn("invalid base64"),
        };
        lines.push(format!(
            "  [Image #{}] {}  {}",
            image.number, image.media_type, size
        ));
    }

    if !view.references.is_empty() {
        lines.push(p.bold("References:"));
        for reference in &view.references {
            let target = match &reference.media_type {
                Some(media_type) => p.ok(media_type),
                None => p.warn("no match"),
            };
            lines.push(format!("  [Image #{}] -> {}", reference.number, target));
        }
    }

    lines.join("\n")
}

pub fn render_issues(view: &IssuesView, p: &Painter) -> String {
    let mut lines = vec![format!(
        "{} decoded, {}",
        plural(view.messages, "message", "messages"),
        plural(view.issues.len(), "issue", "issues")
    )];

    for issue in &view.issues {
        lines.push(format!(
            "  record {}  {}  {}: {}",
            issue.record,
            p.warn(issue_kind_label(issue.kind)),
            issue.field,
            issue.reason
        ));
    }

    lines.join("\n")
}
