//! Completion providers.
//!
//! A provider turns the ordered chat history plus model parameters into one
//! raw completion. The HTTP protocol lives behind [`CompletionProvider`] so
//! the turn pipeline can run against any backend, including scripted ones in
//! tests.

mod models;
mod openrouter;
mod request;

pub use models::{DEFAULT_MODEL, MODEL_CATALOG, ModelInfo, find_model, resolve_model_id};
pub use openrouter::{API_KEY_ENV, DEFAULT_API_BASE, OpenRouterProvider};
pub use request::{
    CompletionParams, CompletionRequest, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE, RawCompletion,
};

use crate::error::ProviderError;
use async_trait::async_trait;

/// A backend that answers chat-completion requests.
///
/// Implementations must be `Send + Sync` so a single provider can serve every
/// turn of an interactive session.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Requests one completion for the given history.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] on transport failures, non-2xx replies, or a
    /// reply without content.
    async fn fetch_completion(
        &self,
        request: &CompletionRequest,
    ) -> Result<RawCompletion, ProviderError>;

    /// Short provider name for logs.
    fn name(&self) -> &'static str;
}
