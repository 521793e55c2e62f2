use super::round_builder::RoundBuilder;
use super::types::{Round, Segmentation};
use crate::classify::is_real_user_prompt;
use roundtrace_types::Message;

/// Partition `messages` into rounds in a single pass.
///
/// A real prompt closes the open round and opens the next one; every other
/// message joins the open round. Messages seen before the first prompt are
/// returned as the preamble instead of being dropped.
pub fn segment(messages: &[Message]) -> Segmentation {
    let mut preamble = Vec::new();
    let mut rounds = Vec::new();
    let mut current: Option<RoundBuilder> = None;

    for (offset, message) in messages.iter().enumerate() {
        if is_real_user_prompt(message) {
            if let Some(builder) = current.take() {
                rounds.push(builder.build(rounds.len()));
            }
            current = Some(RoundBuilder::new(offset, message.clone()));
        } else if let Some(ref mut builder) = current {
            builder.add_message(message.clone());
        } else {
            preamble.push(message.clone());
        }
    }

    if let Some(builder) = current {
        rounds.push(builder.build(rounds.len()));
    }

    if !preamble.is_empty() {
        tracing::debug!(count = preamble.len(), "messages before the first prompt kept as preamble");
    }

    Segmentation { preamble, rounds }
}

/// Rounds only; see [`segment`] for the preamble
pub fn segment_rounds(messages: &[Message]) -> Vec<Round> {
    segment(messages).rounds
}
