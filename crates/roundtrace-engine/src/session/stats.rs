use super::types::*;
use crate::correlation::{InvocationStatus, ToolInvocation};
use crate::images::extract_images;
use roundtrace_types::{Message, Timestamp};

pub fn token_totals<'a>(messages: impl IntoIterator<Item = &'a Message>) -> TokenTotals {
    let mut totals = TokenTotals::default();
    for usage in messages.into_iter().filter_map(|m| m.usage.as_ref()) {
        totals.input = totals.input.saturating_add(usage.input_tokens);
        totals.output = totals.output.saturating_add(usage.output_tokens);
        totals.cache_read = totals
            .cache_read
            .saturating_add(usage.cache_read_input_tokens.unwrap_or(0));
        totals.cache_creation = totals
            .cache_creation
            .saturating_add(usage.cache_creation_input_tokens.unwrap_or(0));
    }
    totals
}

pub fn tool_counts<'a>(invocations: impl IntoIterator<Item = &'a ToolInvocation>) -> ToolCounts {
    let mut counts = ToolCounts::default();
    for invocation in invocations {
        counts.total += 1;
        match invocation.status() {
            InvocationStatus::Pending => counts.pending += 1,
            InvocationStatus::Succeeded => counts.succeeded += 1,
            InvocationStatus::Failed => counts.failed += 1,
        }
    }
    counts
}

/// Round totals; `invocations` are the ones called inside the round
pub fn calculate_round_stats<'a>(
    round: &Round,
    invocations: impl IntoIterator<Item = &'a ToolInvocation>,
) -> RoundStats {
    let last_known = round
        .assistant_messages
        .iter()
        .rev()
        .map(|m| m.timestamp)
        .find(|ts| ts.is_known());

    RoundStats {
        index: round.index,
        tokens: token_totals(&round.assistant_messages),
        cost_usd: round.cost_usd,
        tools: tool_counts(invocations),
        image_count: extract_images(round.messages()).len(),
        duration_ms: last_known.and_then(|end| round.timestamp.millis_until(end)),
    }
}

pub fn calculate_session_stats(
    messages: &[Message],
    preamble_len: usize,
    rounds: &[Round],
    invocations: &[ToolInvocation],
) -> SessionStats {
    let known: Vec<Timestamp> = messages
        .iter()
        .map(|m| m.timestamp)
        .filter(|ts| ts.is_known())
        .collect();
    let duration_ms = match (known.iter().min(), known.iter().max()) {
        (Some(first), Some(last)) => first.millis_until(*last),
        _ => None,
    };

    SessionStats {
        round_count: rounds.len(),
        message_count: messages.len(),
        preamble_count: preamble_len,
        tokens: token_totals(messages),
        cost_usd: messages
            .iter()
            .filter_map(|m| m.cost_usd)
            .fold(0.0, |acc, cost| acc + cost),
        tools: tool_counts(invocations),
        image_count: rounds.iter().map(|r| extract_images(r.messages()).len()).sum(),
        duration_ms,
    }
}
