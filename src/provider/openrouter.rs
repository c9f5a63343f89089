//! `OpenRouter` completion provider.
//!
//! `OpenRouter` speaks the `OpenAI` chat-completions protocol. Request and
//! response bodies use the `async-openai` wire types; the HTTP exchange is
//! done with `reqwest` directly so a non-2xx reply keeps its status and body.
//! Nothing is retried: failed turns are surfaced to the caller.

use super::{CompletionProvider, CompletionRequest, RawCompletion};
use crate::chat::{ChatTurn, Role};
use crate::error::ProviderError;
use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequest, CreateChatCompletionRequestArgs, CreateChatCompletionResponse,
};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use std::fmt;
use tracing::{debug, warn};

/// Default `OpenRouter` API base.
pub const DEFAULT_API_BASE: &str = "https://openrouter.ai/api/v1";

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "OPENROUTER_API_KEY";

/// Completion provider backed by an `OpenAI`-compatible HTTP API.
#[derive(Clone)]
pub struct OpenRouterProvider {
    http: reqwest::Client,
    api_base: String,
    api_key: String,
}

impl fmt::Debug for OpenRouterProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenRouterProvider")
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}

impl OpenRouterProvider {
    /// Creates a provider for the default `OpenRouter` endpoint.
    #[must_use]
    pub fn new(api_key: &str) -> Self {
        Self::with_base(DEFAULT_API_BASE, api_key)
    }

    /// Creates a provider for any `OpenAI`-compatible endpoint.
    #[must_use]
    pub fn with_base(api_base: &str, api_key: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// The API base requests are sent to.
    #[must_use]
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.api_base)
    }
}

#[async_trait]
impl CompletionProvider for OpenRouterProvider {
    async fn fetch_completion(
        &self,
        request: &CompletionRequest,
    ) -> Result<RawCompletion, ProviderError> {
        request.validate()?;
        let body = build_request(request)?;

        debug!(
            model = %request.params.model_id,
            messages = request.messages.len(),
            temperature = request.params.temperature,
            "sending completion request"
        );

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "completion request failed to send");
                ProviderError::Transport(e.to_string())
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        if !status.is_success() {
            let err = ProviderError::Http {
                status: status.as_u16(),
                message: error_message(&text, status),
            };
            warn!(error = %err, "completion request rejected");
            return Err(err);
        }

        parse_completion(&text)
    }

    fn name(&self) -> &'static str {
        "openrouter"
    }
}

/// Extracts the first choice's content from a 2xx body.
///
/// `OpenRouter` can answer 200 with an `{"error": ...}` object; that becomes
/// [`ProviderError::Api`].
pub(crate) fn parse_completion(body: &str) -> Result<RawCompletion, ProviderError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| ProviderError::Transport(format!("invalid response body: {e}")))?;
    if let Some(error) = value.get("error") {
        return Err(ProviderError::Api {
            message: api_error_message(error),
        });
    }

    let response: CreateChatCompletionResponse = serde_json::from_value(value)
        .map_err(|e| ProviderError::Transport(format!("invalid response body: {e}")))?;

    if let Some(usage) = &response.usage {
        debug!(
            prompt_tokens = usage.prompt_tokens,
            completion_tokens = usage.completion_tokens,
            "completion usage"
        );
    }

    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(RawCompletion::new)
        .ok_or(ProviderError::EmptyResponse)
}

/// Human-readable reason for a non-2xx reply.
///
/// Prefers the `error.message` of a JSON error body, then the raw body text,
/// then the status's canonical reason.
fn error_message(body: &str, status: StatusCode) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body)
        && let Some(error) = value.get("error")
    {
        return api_error_message(error);
    }
    let body = body.trim();
    if body.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        body.to_string()
    }
}

fn api_error_message(error: &Value) -> String {
    error
        .get("message")
        .and_then(Value::as_str)
        .or_else(|| error.as_str())
        .map_or_else(|| error.to_string(), str::to_string)
}

/// Converts a request into the wire body.
pub(crate) fn build_request(
    request: &CompletionRequest,
) -> Result<CreateChatCompletionRequest, ProviderError> {
    let messages = request
        .messages
        .iter()
        .map(to_message)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CreateChatCompletionRequestArgs::default()
        .model(request.params.model_id.clone())
        .messages(messages)
        .temperature(request.params.temperature)
        .max_tokens(request.params.max_tokens)
        .build()?)
}

fn to_message(turn: &ChatTurn) -> Result<ChatCompletionRequestMessage, ProviderError> {
    let content = turn.content.clone();
    let message = match turn.role {
        Role::System => ChatCompletionRequestSystemMessageArgs::default()
            .content(content)
            .build()?
            .into(),
        Role::User => ChatCompletionRequestUserMessageArgs::default()
            .content(content)
            .build()?
            .into(),
        Role::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
            .content(content)
            .build()?
            .into(),
    };
    Ok(message)
}
