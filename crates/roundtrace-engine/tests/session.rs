use roundtrace_engine::{
    CorrelationWindow, InvocationStatus, ToolInvocation, assemble_session, correlate,
    extract_images, is_real_user_prompt, reconstruct_from_jsonl, resolve_image_references,
    segment, snapshot_keys,
};
use roundtrace_testing::SampleFiles;
use roundtrace_testing::builders::*;
use roundtrace_testing::fixtures::CLAUDE_SESSION;
use roundtrace_types::{Message, SubType};
use serde_json::json;

fn sample() -> roundtrace_engine::Reconstruction {
    let text = SampleFiles::new().read(CLAUDE_SESSION).unwrap();
    reconstruct_from_jsonl("parser-project", "sess-42", &text)
}

fn by_id<'a>(invocations: &'a [ToolInvocation], id: &str) -> &'a ToolInvocation {
    invocations.iter().find(|inv| inv.id == id).unwrap()
}

#[test]
fn test_sample_rounds() {
    let reconstruction = sample();
    let session = &reconstruction.session;

    assert_eq!(session.messages.len(), 11);
    assert_eq!(session.preamble().len(), 1);
    assert_eq!(
        session.preamble()[0].sub_type,
        Some(SubType::FileHistorySnapshot)
    );
    assert_eq!(session.rounds.len(), 2);

    let first = &session.rounds[0];
    assert_eq!(first.offset, 1);
    assert_eq!(first.prompt_text(), "Fix the failing test in parser.rs");
    assert_eq!(first.message_count(), 7);
    assert_eq!(first.tokens, 540);
    assert!((first.cost_usd - 0.009).abs() < 1e-9);
    assert_eq!(first.tool_call_count, 2);

    let second = &session.rounds[1];
    assert_eq!(second.offset, 8);
    assert_eq!(second.message_count(), 3);
    assert_eq!(second.tokens, 60);
    assert_eq!(second.cost_usd, 0.0);
    assert_eq!(second.tool_call_count, 1);
}

#[test]
fn test_sample_invocations() {
    let reconstruction = sample();
    let session = &reconstruction.session;
    let invocations = &session.invocations;

    assert_eq!(invocations.len(), 3);

    let read = by_id(invocations, "toolu_01");
    assert_eq!(read.status(), InvocationStatus::Succeeded);
    assert_eq!(read.duration_ms, Some(1_500));
    assert_eq!(read.output_text().as_deref(), Some("fn parse() {}"));
    assert_eq!(read.formatted_duration().as_deref(), Some("1.5s"));

    let edit = by_id(invocations, "toolu_02");
    assert_eq!(edit.status(), InvocationStatus::Failed);
    assert_eq!(edit.duration_ms, Some(250));

    let bash = by_id(invocations, "toolu_03");
    assert_eq!(bash.status(), InvocationStatus::Pending);
    assert!(bash.output.is_none());
    assert!(bash.duration_ms.is_none());

    assert_eq!(session.correlation.orphan_results, 1);
    assert_eq!(session.stats.tools.pending, 1);
    assert_eq!(session.invocations_in_round(0).len(), 2);
    assert_eq!(
        session.invocations_for(1, CorrelationWindow::Round)[0].id,
        "toolu_03"
    );
}

#[test]
fn test_sample_stats_and_images() {
    let reconstruction = sample();
    let session = &reconstruction.session;

    assert_eq!(session.stats.round_count, 2);
    assert_eq!(session.stats.tokens.total(), 600);
    assert_eq!(session.stats.tokens.cache_read, 900);
    assert_eq!(session.stats.image_count, 1);
    assert_eq!(session.stats.duration_ms, Some(303_000));

    let first = session.round_stats(0, CorrelationWindow::Session).unwrap();
    assert_eq!(first.duration_ms, Some(8_000));
    assert_eq!(first.tools.failed, 1);

    let images = session.round_images(1);
    assert_eq!(images.len(), 1);
    assert_eq!(images[0].byte_len, Some(8));

    let prompt = session.rounds[1].prompt_text();
    let resolved = resolve_image_references(&prompt, &images);
    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[0].1.map(|img| img.media_type.as_str()), Some("image/png"));

    assert_eq!(reconstruction.issues.len(), 2);
}

#[test]
fn test_sample_snapshot_keys() {
    let reconstruction = sample();
    let session = &reconstruction.session;

    let keys = snapshot_keys(&session.session_id, &session.rounds[0]);
    let pairs: Vec<(&str, &str)> = keys
        .iter()
        .map(|k| (k.message_id.as_str(), k.file_path.as_str()))
        .collect();
    assert_eq!(pairs, vec![("a-1", "src/parser.rs"), ("a-2", "src/parser.rs")]);
}

#[test]
fn test_orphan_tolerance() {
    let messages = vec![
        result("ghost", "late"),
        prompt("go"),
        result("ghost", "again"),
        reply("done"),
    ];
    let segmentation = segment(&messages);
    assert_eq!(segmentation.preamble.len(), 1);
    assert_eq!(segmentation.rounds.len(), 1);
    assert!(correlate(&messages).is_empty());
}

#[test]
fn test_billed_rounds_saturate_instead_of_overflowing() {
    let messages = vec![
        prompt("go"),
        billed(u64::MAX, 1, 0.5, reply("huge")),
        billed(10, 10, 0.25, reply("small")),
        prompt("again"),
        billed(100, 20, 0.125, reply("fine")),
    ];
    let session = assemble_session("p", "s", messages);

    assert_eq!(session.rounds[0].tokens, u64::MAX);
    assert_eq!(session.rounds[0].cost_usd, 0.75);
    assert_eq!(session.rounds[1].tokens, 120);
    assert_eq!(session.stats.tokens.input, u64::MAX);
    assert_eq!(session.stats.tokens.output, 31);
    assert_eq!(session.stats.tokens.total(), u64::MAX);
    assert_eq!(session.stats.cost_usd, 0.875);
}

#[test]
fn test_duration_never_negative() {
    let messages = vec![
        prompt("go"),
        at(5_000, call("t1", "Bash", json!({"command": "ls"}))),
        at(4_000, result("t1", "clock skew")),
        call("t2", "Bash", json!({})),
        at(9_000, result("t2", "unknown call time")),
    ];
    let invocations = correlate(&messages);
    assert!(invocations[0].is_resolved());
    assert_eq!(invocations[0].duration_ms, None);
    assert_eq!(invocations[1].duration_ms, None);
}

/// Small deterministic generator so the partition check covers many shapes
struct Lcg(u64);

impl Lcg {
    fn next(&mut self, bound: u64) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (self.0 >> 33) % bound
    }
}

fn random_conversation(rng: &mut Lcg) -> Vec<Message> {
    let len = rng.next(30) as usize;
    (0..len)
        .map(|i| {
            let id = format!("t{}", rng.next(5));
            match rng.next(7) {
                0 => prompt("question"),
                1 => prompt("  "),
                2 => reply("answer"),
                3 => call(&id, "Bash", json!({"command": "ls"})),
                4 => at(i as i64 * 1_000 + 1, result(&id, "out")),
                5 => internal(SubType::Summary, "summary"),
                _ => error_result(&id, "boom"),
            }
        })
        .collect()
}

#[test]
fn test_partition_and_correlation_properties() {
    let mut rng = Lcg(42);

    for _ in 0..200 {
        let messages = random_conversation(&mut rng);
        let segmentation = segment(&messages);

        let mut rebuilt = segmentation.preamble.clone();
        for (idx, round) in segmentation.rounds.iter().enumerate() {
            assert_eq!(round.index, idx);
            assert!(is_real_user_prompt(&round.user_message));
            rebuilt.extend(round.messages().cloned());
        }
        assert_eq!(rebuilt, messages);
        assert_eq!(segment(&messages), segmentation);

        let invocations = correlate(&messages);
        assert_eq!(invocations, correlate(&messages));
        let calls: usize = messages.iter().map(Message::tool_use_count).sum();
        assert_eq!(invocations.len(), calls);
        for (idx, invocation) in invocations.iter().enumerate() {
            assert_eq!(invocation.sequence_index, idx);
        }

        let total_images: usize = segmentation
            .rounds
            .iter()
            .map(|r| extract_images(r.messages()).len())
            .sum();
        assert_eq!(total_images, 0);
    }
}

#[test]
fn test_sample_correlation_report() {
    let reconstruction = sample();
    insta::assert_json_snapshot!(reconstruction.session.correlation, @r#"
    {
      "orphan_results": 1,
      "duplicate_results": 0,
      "reused_ids": 0,
      "skipped_blocks": 0
    }
    "#);
}
