//! Completion request and response types.

use crate::chat::{ChatHistory, ChatTurn};
use crate::error::ProviderError;
use serde::Serialize;
use std::fmt;

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Default cap on generated tokens.
pub const DEFAULT_MAX_TOKENS: u32 = 1000;

/// Model and sampling parameters for a turn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionParams {
    /// Provider model identifier (e.g. `mistralai/mistral-7b-instruct:free`).
    pub model_id: String,
    /// Sampling temperature in `[0, 1]`.
    pub temperature: f32,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
}

impl CompletionParams {
    /// Creates parameters for `model_id` with default sampling.
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    /// Sets the temperature.
    #[must_use]
    pub const fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Sets the token cap.
    #[must_use]
    pub const fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// A request to the completion provider.
///
/// Carries the full ordered history, the model id, and sampling parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    /// Conversation so far, oldest first.
    pub messages: Vec<ChatTurn>,
    /// Model and sampling parameters.
    #[serde(flatten)]
    pub params: CompletionParams,
}

impl CompletionRequest {
    /// Builds a request from a snapshot of `history`.
    #[must_use]
    pub fn from_history(history: &ChatHistory, params: &CompletionParams) -> Self {
        Self {
            messages: history.turns().to_vec(),
            params: params.clone(),
        }
    }

    /// Checks parameters before sending.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::InvalidRequest`] for an empty model id, an
    /// empty message list, a temperature outside `[0, 1]`, or a zero token cap.
    pub fn validate(&self) -> Result<(), ProviderError> {
        if self.params.model_id.trim().is_empty() {
            return Err(ProviderError::InvalidRequest(
                "model id must not be empty".to_string(),
            ));
        }
        if self.messages.is_empty() {
            return Err(ProviderError::InvalidRequest(
                "request has no messages".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.params.temperature) {
            return Err(ProviderError::InvalidRequest(format!(
                "temperature {} is outside [0, 1]",
                self.params.temperature
            )));
        }
        if self.params.max_tokens == 0 {
            return Err(ProviderError::InvalidRequest(
                "max_tokens must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Unprocessed completion text as returned by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCompletion(String);

impl RawCompletion {
    /// Wraps provider output.
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// The raw text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the completion, returning the text.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for RawCompletion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
