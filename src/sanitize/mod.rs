//! Response sanitizing.
//!
//! Turns a raw completion into a cleaned completion: every known control
//! token is removed and whitespace is normalized. Cleaning is total and
//! deterministic.

mod tokens;

pub use tokens::DEFAULT_CONTROL_TOKENS;

use tracing::trace;

/// Strips model control tokens from completions.
///
/// Tokens are removed as literal substrings, longest first, and removal is
/// repeated until none remain. Whitespace runs are collapsed to a single
/// ASCII space and the result is trimmed. Whitespace inside a token matches
/// any whitespace run in the text.
///
/// # Examples
///
/// ```
/// use lunga_rs::sanitize::ResponseSanitizer;
///
/// let sanitizer = ResponseSanitizer::new();
/// assert_eq!(sanitizer.clean("[INST]Hi[/INST] there"), "Hi there");
/// assert_eq!(sanitizer.clean("   <s>hello</s>   world  "), "hello world");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseSanitizer {
    tokens: Vec<String>,
}

impl Default for ResponseSanitizer {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseSanitizer {
    /// Creates a sanitizer with [`DEFAULT_CONTROL_TOKENS`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_tokens(DEFAULT_CONTROL_TOKENS.iter().copied())
    }

    /// Creates a sanitizer with a custom token set.
    ///
    /// Whitespace inside tokens is collapsed like the text itself; tokens that
    /// are empty after trimming are ignored.
    #[must_use]
    pub fn with_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: tokens::normalize_tokens(tokens),
        }
    }

    /// Returns a copy of this sanitizer with additional tokens.
    #[must_use]
    pub fn extended<I, S>(&self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let all = self
            .tokens
            .iter()
            .cloned()
            .chain(extra.into_iter().map(Into::into));
        Self::with_tokens(all)
    }

    /// The active tokens, longest first.
    #[must_use]
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Cleans a raw completion.
    ///
    /// Empty or all-token input yields an empty string.
    #[must_use]
    pub fn clean(&self, raw: &str) -> String {
        let mut cleaned = normalize_whitespace(raw);
        // Stripping can join whitespace runs and collapsing can join a
        // multi-word token, so both repeat until the text is stable. After
        // the first pass every change shortens the text.
        loop {
            let next = normalize_whitespace(&self.strip_tokens(&cleaned));
            if next == cleaned {
                break;
            }
            cleaned = next;
        }
        trace!(raw_len = raw.len(), cleaned_len = cleaned.len(), "cleaned completion");
        cleaned
    }

    /// Returns whether `text` contains any active token.
    #[must_use]
    pub fn contains_token(&self, text: &str) -> bool {
        self.tokens.iter().any(|t| text.contains(t.as_str()))
    }

    fn strip_tokens(&self, raw: &str) -> String {
        let mut text = raw.to_string();
        // Each pass strictly shortens the text, so this terminates.
        while self.contains_token(&text) {
            for token in &self.tokens {
                if text.contains(token.as_str()) {
                    text = text.replace(token.as_str(), "");
                }
            }
        }
        text
    }
}

/// Collapses whitespace runs to one ASCII space and trims both ends.
#[must_use]
pub fn normalize_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for word in text.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

/// Cleans `raw` with the default token set.
#[must_use]
pub fn clean(raw: &str) -> String {
    ResponseSanitizer::new().clean(raw)
}
