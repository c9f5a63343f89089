//! Built-in model catalog.

use crate::error::{Error, Result};
use serde::Serialize;

/// A selectable model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModelInfo {
    /// Display name.
    pub name: &'static str,
    /// Provider model identifier.
    pub id: &'static str,
    /// One-line description.
    pub description: &'static str,
}

/// Models offered by name.
pub const MODEL_CATALOG: &[ModelInfo] = &[
    ModelInfo {
        name: "Mistral 7B (Free)",
        id: "mistralai/mistral-7b-instruct:free",
        description: "Powerful open-source model with good general capabilities",
    },
    ModelInfo {
        name: "DeepSeek V3 (Free)",
        id: "deepseek/deepseek-chat-v3-0324:free",
        description: "Advanced model with strong reasoning abilities",
    },
    ModelInfo {
        name: "Llama 3.1 8B (Free)",
        id: "meta-llama/llama-3.1-8b-instruct:free",
        description: "Meta's latest model with broad knowledge",
    },
    ModelInfo {
        name: "Grok 3 (Free)",
        id: "x-ai/grok-4-fast:free",
        description: "Grok 3 is a powerful model with strong reasoning abilities",
    },
];

/// Default model display name.
pub const DEFAULT_MODEL: &str = "Mistral 7B (Free)";

/// Looks up a catalog entry by display name (case-insensitive) or id.
#[must_use]
pub fn find_model(query: &str) -> Option<&'static ModelInfo> {
    let query = query.trim();
    MODEL_CATALOG
        .iter()
        .find(|m| m.name.eq_ignore_ascii_case(query) || m.id == query)
}

/// Resolves a display name or id to the id sent to the provider.
///
/// Anything containing `/` that is not in the catalog is passed through as a
/// raw provider id.
///
/// # Errors
///
/// Returns a configuration error for unknown names.
///
/// # Examples
///
/// ```
/// use lunga_rs::provider::resolve_model_id;
///
/// assert_eq!(
///     resolve_model_id("mistral 7b (free)").unwrap(),
///     "mistralai/mistral-7b-instruct:free"
/// );
/// assert_eq!(resolve_model_id("openai/gpt-4o").unwrap(), "openai/gpt-4o");
/// assert!(resolve_model_id("gpt").is_err());
/// ```
pub fn resolve_model_id(query: &str) -> Result<String> {
    if let Some(model) = find_model(query) {
        return Ok(model.id.to_string());
    }
    let query = query.trim();
    if query.contains('/') {
        return Ok(query.to_string());
    }
    let known: Vec<&str> = MODEL_CATALOG.iter().map(|m| m.name).collect();
    Err(Error::config(format!(
        "unknown model '{query}' (known: {})",
        known.join(", ")
    )))
}
