//! Integration tests for lunga-rs.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use async_trait::async_trait;
use lunga_rs::{
    ChatHistory, ChatTurn, CompletionParams, CompletionProvider, CompletionRequest,
    DEFAULT_CONTROL_TOKENS, DisplaySink, Error, IncrementalRevealer, MemorySink, ProviderError,
    RawCompletion, ResponseSanitizer, RevealFrame, RevealOutcome, Role, SinkWriteError,
    TurnOutcome, TurnPipeline, clean,
};
use proptest::prelude::*;
use std::io;
use std::sync::Mutex;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Provider that answers each request with the next scripted reply.
struct Scripted {
    replies: Mutex<Vec<Result<String, ProviderError>>>,
}

impl Scripted {
    fn new(replies: Vec<Result<String, ProviderError>>) -> Self {
        let mut replies = replies;
        replies.reverse();
        Self {
            replies: Mutex::new(replies),
        }
    }
}

#[async_trait]
impl CompletionProvider for Scripted {
    async fn fetch_completion(
        &self,
        _request: &CompletionRequest,
    ) -> Result<RawCompletion, ProviderError> {
        self.replies
            .lock()
            .unwrap()
            .pop()
            .unwrap_or(Err(ProviderError::EmptyResponse))
            .map(RawCompletion::new)
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// Sink that fails on a given frame index.
struct FailAt {
    index: usize,
    seen: Vec<RevealFrame>,
}

impl DisplaySink for FailAt {
    fn append(&mut self, frame: &RevealFrame) -> io::Result<()> {
        if self.seen.len() == self.index {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "display closed"));
        }
        self.seen.push(frame.clone());
        Ok(())
    }
}

fn instant() -> IncrementalRevealer {
    IncrementalRevealer::new(Duration::ZERO)
}

// ==================== Sanitizer ====================

#[test]
fn test_clean_examples() {
    assert_eq!(clean(""), "");
    assert_eq!(clean("   <s>hello</s>   world  "), "hello world");
    assert_eq!(clean("[INST]Hi[/INST] there"), "Hi there");
    assert_eq!(clean("already clean"), "already clean");
}

fn token_soup() -> impl Strategy<Value = String> {
    let pieces = prop_oneof![
        prop::sample::select(DEFAULT_CONTROL_TOKENS).prop_map(str::to_string),
        "[a-zA-Z ]{0,6}",
        prop::sample::select(vec![" ", "\t", "\n", "[", "<", "|", ">", "/", "#"])
            .prop_map(str::to_string),
    ];
    prop::collection::vec(pieces, 0..16).prop_map(|parts| parts.concat())
}

proptest! {
    #[test]
    fn prop_no_token_survives(raw in token_soup()) {
        let cleaned = clean(&raw);
        for token in DEFAULT_CONTROL_TOKENS {
            prop_assert!(!cleaned.contains(token), "{token:?} left in {cleaned:?}");
        }
    }

    #[test]
    fn prop_clean_is_idempotent(raw in token_soup()) {
        let once = clean(&raw);
        prop_assert_eq!(clean(&once), once);
    }

    #[test]
    fn prop_clean_is_idempotent_with_multi_word_tokens(
        words in prop::collection::vec(
            prop::sample::select(vec!["end", "turn", "<s>", "x", " ", "  ", "\n"]),
            0..20,
        )
    ) {
        let sanitizer = ResponseSanitizer::new().extended(["end turn", "x  <s> x"]);
        let raw = words.concat();
        let once = sanitizer.clean(&raw);
        prop_assert_eq!(sanitizer.clean(&once), once.clone());
        prop_assert!(!sanitizer.contains_token(&once), "{once:?}");
    }

    #[test]
    fn prop_clean_is_normalized(raw in token_soup()) {
        let cleaned = clean(&raw);
        prop_assert_eq!(cleaned.trim(), cleaned.as_str());
        prop_assert!(!cleaned.contains("  "));
        prop_assert!(!cleaned.contains(['\t', '\n']));
    }

    #[test]
    fn prop_reveal_frames_grow(words in prop::collection::vec("[a-z]{1,5}", 0..12)) {
        let text = words.join(" ");
        let mut sink = MemorySink::new();
        let outcome = instant()
            .reveal_blocking(&text, &mut sink, &CancellationToken::new())
            .unwrap();
        prop_assert!(outcome.is_completed());

        let frames = sink.into_frames();
        prop_assert_eq!(frames.len(), words.len() + 1);

        let (last, progress) = frames.split_last().unwrap();
        prop_assert!(last.terminal);
        prop_assert_eq!(&last.content, &text);

        let mut previous = String::new();
        for frame in progress {
            prop_assert!(!frame.terminal);
            let body = frame.content.strip_suffix('▌').unwrap();
            prop_assert!(body.starts_with(&previous));
            prop_assert!(body.len() > previous.len());
            previous = body.to_string();
        }
        prop_assert_eq!(previous.trim_end(), text.as_str());
    }
}

// ==================== Reveal ====================

#[test]
fn test_reveal_three_words() {
    let mut sink = MemorySink::new();
    instant()
        .reveal_blocking("a b c", &mut sink, &CancellationToken::new())
        .unwrap();
    let contents: Vec<&str> = sink.frames().iter().map(|f| f.content.as_str()).collect();
    assert_eq!(contents, vec!["a ▌", "a b ▌", "a b c ▌", "a b c"]);
}

#[tokio::test]
async fn test_spawned_reveal_streams_frames() {
    let token = CancellationToken::new();
    let mut task = instant().spawn("one two".to_string(), &token);

    let mut frames = Vec::new();
    while let Some(frame) = task.next_frame().await {
        frames.push(frame);
    }
    assert_eq!(frames.len(), 3);
    assert_eq!(task.join().await.unwrap(), RevealOutcome::Completed);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_mid_reveal_writes_no_terminal_frame() {
    let token = CancellationToken::new();
    let revealer = IncrementalRevealer::new(Duration::from_millis(50));
    let mut sink = MemorySink::new();

    let canceller = {
        let token = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(75)).await;
            token.cancel();
        })
    };

    let outcome = revealer
        .reveal("w1 w2 w3 w4 w5", &mut sink, &token)
        .await
        .unwrap();
    canceller.await.unwrap();

    assert!(!outcome.is_completed());
    assert!(sink.frames().iter().all(|f| !f.terminal));
    assert!(!sink.frames().is_empty());
}

// ==================== Pipeline ====================

#[tokio::test]
async fn test_conversation_over_two_turns() {
    let provider = Scripted::new(vec![
        Ok("<|im_start|>Hello!<|im_end|>".to_string()),
        Ok("Assistant: Fine,   thanks.".to_string()),
    ]);
    let pipeline = TurnPipeline::new(&provider).with_revealer(instant());
    let params = CompletionParams::new("m/x");
    let mut history = ChatHistory::new();

    for prompt in ["hi", "how are you?"] {
        let outcome = pipeline
            .run(
                &mut history,
                prompt,
                &params,
                &mut MemorySink::new(),
                &CancellationToken::new(),
            )
            .await
            .unwrap();
        assert!(matches!(outcome, TurnOutcome::Completed { .. }));
    }

    let roles: Vec<Role> = history.turns().iter().map(|t| t.role).collect();
    assert_eq!(
        roles,
        vec![Role::User, Role::Assistant, Role::User, Role::Assistant]
    );
    assert_eq!(history.turns()[3], ChatTurn::assistant("Fine, thanks."));
    assert_eq!(history.message_count(), 4);
}

#[tokio::test]
async fn test_sink_failure_records_no_assistant_turn() {
    let provider = Scripted::new(vec![Ok("one two three".to_string())]);
    let pipeline = TurnPipeline::new(&provider).with_revealer(instant());
    let mut history = ChatHistory::new();
    let mut sink = FailAt {
        index: 1,
        seen: Vec::new(),
    };

    let err = pipeline
        .run(
            &mut history,
            "count",
            &CompletionParams::new("m/x"),
            &mut sink,
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

    assert!(
        matches!(err, Error::Sink(SinkWriteError { frame: 1, .. })),
        "{err:?}"
    );
    assert_eq!(sink.seen.len(), 1);
    assert_eq!(history.turns(), &[ChatTurn::user("count")]);
}

#[tokio::test]
async fn test_failed_turn_then_retry_by_caller() {
    let provider = Scripted::new(vec![
        Err(ProviderError::Transport("connection reset".to_string())),
        Ok("recovered".to_string()),
    ]);
    let pipeline = TurnPipeline::new(&provider).with_revealer(instant());
    let params = CompletionParams::new("m/x");
    let mut history = ChatHistory::new();

    let err = pipeline
        .run(
            &mut history,
            "first",
            &params,
            &mut MemorySink::new(),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Provider(ProviderError::Transport(_))));

    let outcome = pipeline
        .run(
            &mut history,
            "again",
            &params,
            &mut MemorySink::new(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();
    assert_eq!(outcome.content(), Some("recovered"));
    assert_eq!(history.len(), 3);
}

#[tokio::test]
async fn test_custom_sanitizer_in_pipeline() {
    let provider = Scripted::new(vec![Ok("done<|eot_id|>".to_string())]);
    let pipeline = TurnPipeline::new(&provider)
        .with_revealer(instant())
        .with_sanitizer(ResponseSanitizer::new().extended(["<|eot_id|>".to_string()]));
    let mut history = ChatHistory::new();

    let outcome = pipeline
        .run(
            &mut history,
            "go",
            &CompletionParams::new("m/x"),
            &mut MemorySink::new(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();
    assert_eq!(outcome.content(), Some("done"));
}
