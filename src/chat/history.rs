//! Chat turns and the caller-owned history log.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Author of a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions (request-side only).
    System,
    /// The person chatting.
    User,
    /// The model.
    Assistant,
}

impl Role {
    /// Wire name of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One message in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    /// Who wrote the message.
    pub role: Role,
    /// Message text.
    pub content: String,
}

impl ChatTurn {
    /// Creates a turn.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Creates a user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Creates an assistant turn.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Ordered, append-only conversation log.
///
/// The log is owned by the caller and lent to the turn pipeline, which only
/// reads it and appends to it. [`ChatHistory::clear`] is the one way to drop
/// turns and is reserved for the owner.
///
/// # Examples
///
/// ```
/// use lunga_rs::chat::{ChatHistory, ChatTurn};
///
/// let mut history = ChatHistory::new();
/// history.push(ChatTurn::user("hi"));
/// assert_eq!(history.len(), 1);
/// assert_eq!(history.message_count(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatHistory {
    turns: Vec<ChatTurn>,
    #[serde(default)]
    message_count: u64,
}

impl ChatHistory {
    /// Creates an empty history.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            turns: Vec::new(),
            message_count: 0,
        }
    }

    /// Appends a turn.
    pub fn push(&mut self, turn: ChatTurn) {
        self.turns.push(turn);
        self.message_count += 1;
    }

    /// All turns in order.
    #[must_use]
    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    /// The most recent turn.
    #[must_use]
    pub fn last(&self) -> Option<&ChatTurn> {
        self.turns.last()
    }

    /// Number of turns held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Returns `true` if the history holds no turns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Messages appended since creation or the last clear.
    #[must_use]
    pub const fn message_count(&self) -> u64 {
        self.message_count
    }

    /// Drops every turn and resets the message count.
    pub fn clear(&mut self) {
        self.turns.clear();
        self.message_count = 0;
    }
}

impl<'a> IntoIterator for &'a ChatHistory {
    type Item = &'a ChatTurn;
    type IntoIter = std::slice::Iter<'a, ChatTurn>;

    fn into_iter(self) -> Self::IntoIter {
        self.turns.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serde() {
        let turn = ChatTurn::user("hello");
        let json = serde_json::to_string(&turn).unwrap();
        assert_eq!(json, r#"{"role":"user","content":"hello"}"#);

        let back: ChatTurn =
            serde_json::from_str(r#"{"role":"assistant","content":"x"}"#).unwrap();
        assert_eq!(back, ChatTurn::assistant("x"));
    }

    #[test]
    fn test_history_append_order() {
        let mut history = ChatHistory::new();
        history.push(ChatTurn::user("q"));
        history.push(ChatTurn::assistant("a"));
        let roles: Vec<Role> = history.turns().iter().map(|t| t.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant]);
        assert_eq!(history.last().map(|t| t.content.as_str()), Some("a"));
    }

    #[test]
    fn test_history_clear_resets_count() {
        let mut history = ChatHistory::new();
        history.push(ChatTurn::user("q"));
        history.push(ChatTurn::assistant("a"));
        assert_eq!(history.message_count(), 2);
        history.clear();
        assert!(history.is_empty());
        assert_eq!(history.message_count(), 0);
    }

    #[test]
    fn test_history_deserialize_without_count() {
        let history: ChatHistory =
            serde_json::from_str(r#"{"turns":[{"role":"user","content":"hi"}]}"#).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history.message_count(), 0);
    }

    #[test]
    fn test_role_display() {
        assert_eq!(Role::Assistant.to_string(), "assistant");
        assert_eq!(Role::System.as_str(), "system");
    }
}
