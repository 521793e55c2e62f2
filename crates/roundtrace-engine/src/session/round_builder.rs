use super::types::Round;
use roundtrace_types::Message;

/// Accumulates one round: the opening prompt plus everything after it
pub struct RoundBuilder {
    offset: usize,
    user: Message,
    assistants: Vec<Message>,
}

impl RoundBuilder {
    pub fn new(offset: usize, user: Message) -> Self {
        Self {
            offset,
            user,
            assistants: Vec::new(),
        }
    }

    pub fn add_message(&mut self, message: Message) {
        self.assistants.push(message);
    }

    pub fn build(self, index: usize) -> Round {
        let tokens = self
            .assistants
            .iter()
            .map(Message::total_tokens)
            .fold(0, u64::saturating_add);
        let cost_usd = self
            .assistants
            .iter()
            .filter_map(|m| m.cost_usd)
            .fold(0.0, |acc, cost| acc + cost);
        let tool_call_count = self.assistants.iter().map(Message::tool_use_count).sum();

        Round {
            index,
            timestamp: self.user.timestamp,
            user_message: self.user,
            assistant_messages: self.assistants,
            offset: self.offset,
            tokens,
            cost_usd,
            tool_call_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roundtrace_types::{ContentBlock, Role, Timestamp, Usage};
    use serde_json::json;

    #[test]
    fn test_round_without_replies() {
        let user = Message::user("Hello").with_timestamp(Timestamp::from_millis(42));
        let round = RoundBuilder::new(3, user).build(0);

        assert_eq!(round.index, 0);
        assert_eq!(round.offset, 3);
        assert!(round.assistant_messages.is_empty());
        assert_eq!(round.tokens, 0);
        assert_eq!(round.cost_usd, 0.0);
        assert_eq!(round.timestamp, Timestamp::from_millis(42));
    }

    #[test]
    fn test_aggregates_over_assistant_messages() {
        let mut builder = RoundBuilder::new(
            0,
            Message::user("go").with_usage(Usage::new(1_000, 1_000)),
        );
        builder.add_message(
            Message::new(
                Role::Assistant,
                vec![
                    ContentBlock::tool_use("a1", "read", json!({})),
                    ContentBlock::tool_use("a2", "grep", json!({})),
                ],
            )
            .with_usage(Usage::new(100, 20))
            .with_cost(0.25),
        );
        builder.add_message(Message::new(
            Role::User,
            vec![ContentBlock::tool_result("a1", json!("ok"), false)],
        ));
        builder.add_message(
            Message::assistant("done")
                .with_usage(Usage::new(50, 5))
                .with_cost(0.5),
        );

        let round = builder.build(7);
        assert_eq!(round.index, 7);
        // the prompt's own usage is not part of the round total
        assert_eq!(round.tokens, 175);
        assert_eq!(round.cost_usd, 0.75);
        assert_eq!(round.tool_call_count, 2);
        assert_eq!(round.message_count(), 4);
        assert_eq!(round.end_offset(), 4);
    }
}
