//! The per-turn pipeline: request, clean, reveal, record.

use super::history::{ChatHistory, ChatTurn};
use crate::error::{Error, ProviderError, Result};
use crate::provider::{CompletionParams, CompletionProvider, CompletionRequest};
use crate::reveal::{DisplaySink, IncrementalRevealer, RevealOutcome};
use crate::sanitize::ResponseSanitizer;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Result of a turn that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The reply was fully revealed and recorded.
    Completed {
        /// Cleaned reply, as appended to the history.
        content: String,
    },
    /// The caller cancelled before the reveal finished. Nothing was recorded
    /// for the assistant.
    Cancelled,
}

impl TurnOutcome {
    /// The recorded reply, if the turn completed.
    #[must_use]
    pub fn content(&self) -> Option<&str> {
        match self {
            Self::Completed { content } => Some(content),
            Self::Cancelled => None,
        }
    }
}

/// Runs chat turns against a provider.
///
/// Holds no conversation state: the history is lent in for each turn.
pub struct TurnPipeline<'p> {
    provider: &'p dyn CompletionProvider,
    sanitizer: ResponseSanitizer,
    revealer: IncrementalRevealer,
}

impl<'p> TurnPipeline<'p> {
    /// Creates a pipeline with the default sanitizer and revealer.
    #[must_use]
    pub fn new(provider: &'p dyn CompletionProvider) -> Self {
        Self {
            provider,
            sanitizer: ResponseSanitizer::new(),
            revealer: IncrementalRevealer::default(),
        }
    }

    /// Replaces the sanitizer.
    #[must_use]
    pub fn with_sanitizer(mut self, sanitizer: ResponseSanitizer) -> Self {
        self.sanitizer = sanitizer;
        self
    }

    /// Replaces the revealer.
    #[must_use]
    pub fn with_revealer(mut self, revealer: IncrementalRevealer) -> Self {
        self.revealer = revealer;
        self
    }

    /// The active sanitizer.
    #[must_use]
    pub const fn sanitizer(&self) -> &ResponseSanitizer {
        &self.sanitizer
    }

    /// The active revealer.
    #[must_use]
    pub const fn revealer(&self) -> &IncrementalRevealer {
        &self.revealer
    }

    /// Runs one turn.
    ///
    /// The user message is appended to `history` immediately. The assistant
    /// reply is appended only after its terminal frame reaches `sink`.
    /// Cancelling `cancel` during the request or the reveal ends the turn
    /// with [`TurnOutcome::Cancelled`].
    ///
    /// # Errors
    ///
    /// - [`Error::Provider`] if the request fails or the cleaned reply is
    ///   empty.
    /// - [`Error::Sink`] if `sink` rejects a frame.
    ///
    /// In both cases no assistant turn is recorded.
    pub async fn run<S>(
        &self,
        history: &mut ChatHistory,
        prompt: &str,
        params: &CompletionParams,
        sink: &mut S,
        cancel: &CancellationToken,
    ) -> Result<TurnOutcome>
    where
        S: DisplaySink + ?Sized,
    {
        history.push(ChatTurn::user(prompt));
        let request = CompletionRequest::from_history(history, params);

        debug!(
            provider = self.provider.name(),
            model = %params.model_id,
            turns = history.len(),
            "starting turn"
        );

        let raw = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                info!("turn cancelled while waiting for the provider");
                return Ok(TurnOutcome::Cancelled);
            }
            raw = self.provider.fetch_completion(&request) => raw.map_err(|e| {
                warn!(error = %e, "provider request failed");
                Error::Provider(e)
            })?,
        };

        let cleaned = self.sanitizer.clean(raw.as_str());
        if cleaned.is_empty() {
            warn!(raw_len = raw.as_str().len(), "reply was empty after cleaning");
            return Err(ProviderError::EmptyResponse.into());
        }

        match self.revealer.reveal(&cleaned, sink, cancel).await? {
            RevealOutcome::Completed => {
                history.push(ChatTurn::assistant(cleaned.clone()));
                Ok(TurnOutcome::Completed { content: cleaned })
            }
            RevealOutcome::Cancelled { frames_written } => {
                info!(frames_written, "turn cancelled during reveal");
                Ok(TurnOutcome::Cancelled)
            }
        }
    }
}
