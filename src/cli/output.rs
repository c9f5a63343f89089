//! Output formatting for CLI commands.
//!
//! Supports text and JSON output formats.

use crate::chat::ChatHistory;
use crate::error::{Error, ProviderError};
use crate::provider::ModelInfo;
use crate::reveal::RevealFrame;
use serde::Serialize;
use std::fmt::Write;

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// JSON output.
    Json,
}

impl OutputFormat {
    /// Parses format from string.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

/// Formats the model catalog.
#[must_use]
pub fn format_models(models: &[ModelInfo], current: Option<&str>, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format_models_text(models, current),
        OutputFormat::Json => format_json(&models),
    }
}

fn format_models_text(models: &[ModelInfo], current: Option<&str>) -> String {
    let mut output = String::new();
    output.push_str("Models:\n");
    let _ = writeln!(output, "  {:<22} {:<40} Description", "Name", "Id");
    output.push_str(&"-".repeat(100));
    output.push('\n');

    for model in models {
        let marker = if current == Some(model.id) { '*' } else { ' ' };
        let _ = writeln!(
            output,
            "{marker} {:<22} {:<40} {}",
            model.name,
            model.id,
            truncate(model.description, 60)
        );
    }

    output
}

/// Formats the result of cleaning text.
#[must_use]
pub fn format_clean(raw: &str, cleaned: &str, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            let mut output = cleaned.to_string();
            output.push('\n');
            output
        }
        OutputFormat::Json => {
            #[derive(Serialize)]
            struct CleanOutput<'a> {
                raw_length: usize,
                cleaned_length: usize,
                cleaned: &'a str,
            }
            format_json(&CleanOutput {
                raw_length: raw.len(),
                cleaned_length: cleaned.len(),
                cleaned,
            })
        }
    }
}

/// Formats a one-shot reply as JSON, including every reveal frame.
#[must_use]
pub fn format_reply_json(model: &str, content: &str, frames: &[RevealFrame]) -> String {
    #[derive(Serialize)]
    struct ReplyOutput<'a> {
        model: &'a str,
        content: &'a str,
        frames: &'a [RevealFrame],
    }
    format_json(&ReplyOutput {
        model,
        content,
        frames,
    })
}

/// Formats a transcript for saving.
#[must_use]
pub fn format_transcript(history: &ChatHistory) -> String {
    format_json(history)
}

/// Formats an error for display.
#[must_use]
pub fn format_error(error: &Error, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => error.to_string(),
        OutputFormat::Json => {
            #[derive(Serialize)]
            struct ErrorOutput {
                error: &'static str,
                message: String,
            }
            format_json(&ErrorOutput {
                error: error_kind(error),
                message: error.to_string(),
            })
        }
    }
}

/// Short machine-readable error kind.
#[must_use]
pub const fn error_kind(error: &Error) -> &'static str {
    match error {
        Error::Provider(ProviderError::EmptyResponse) => "empty_response",
        Error::Provider(_) => "provider",
        Error::Sink(_) => "display",
        Error::Io(_) => "io",
        Error::Command(_) => "command",
        Error::InvalidState { .. } => "invalid_state",
        Error::Config { .. } => "config",
    }
}

/// Formats a value as JSON.
fn format_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

/// Truncates a string to max characters with ellipsis.
fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else if max_chars <= 3 {
        s.chars().take(max_chars).collect()
    } else {
        let head: String = s.chars().take(max_chars - 3).collect();
        format!("{head}...")
    }
}
