//! Chat history and the turn pipeline.
//!
//! The history is an explicit value owned by the caller. A turn borrows it,
//! appends the user message, asks the provider for a reply, cleans it,
//! reveals it, and appends the reply only once the reveal has finished.

mod history;
mod turn;

pub use history::{ChatHistory, ChatTurn, Role};
pub use turn::{TurnOutcome, TurnPipeline};
