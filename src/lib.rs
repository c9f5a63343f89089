//! # lunga-rs
//!
//! Terminal chat with hosted language models.
//!
//! lunga-rs forwards a conversation to an `OpenAI`-compatible completion
//! endpoint (`OpenRouter` by default), strips model control tokens from the
//! reply, and reveals it word by word so a single blocking reply reads like a
//! stream.
//!
//! ## Features
//!
//! - **Sanitizing**: literal control-token removal with whitespace normalization
//! - **Revealing**: paced, cancellable frame output to any display sink
//! - **Chat pipeline**: explicit, caller-owned history per turn
//! - **Providers**: pluggable completion backends behind an async trait
//!
//! ## Example
//!
//! ```
//! use lunga_rs::{IncrementalRevealer, MemorySink, ResponseSanitizer};
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//!
//! let cleaned = ResponseSanitizer::new().clean("<s>[INST]Hello   world[/INST]</s>");
//! assert_eq!(cleaned, "Hello world");
//!
//! let mut sink = MemorySink::new();
//! let outcome = IncrementalRevealer::new(Duration::ZERO)
//!     .reveal_blocking(&cleaned, &mut sink, &CancellationToken::new())
//!     .unwrap();
//! assert!(outcome.is_completed());
//! assert_eq!(sink.last().map(|f| f.content.as_str()), Some("Hello world"));
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod chat;
pub mod cli;
pub mod config;
pub mod error;
pub mod provider;
pub mod reveal;
pub mod sanitize;

// Re-export commonly used types at crate root
pub use error::{Error, ProviderError, Result, SinkWriteError};

// Re-export the core
pub use reveal::{
    ChannelSink, DEFAULT_PACE_MS, DisplaySink, IncrementalRevealer, MemorySink, RevealFrame,
    RevealOutcome, RevealTask, TerminalSink,
};
pub use sanitize::{DEFAULT_CONTROL_TOKENS, ResponseSanitizer, clean};

// Re-export chat and provider types
pub use chat::{ChatHistory, ChatTurn, Role, TurnOutcome, TurnPipeline};
pub use config::ChatConfig;
pub use provider::{
    CompletionParams, CompletionProvider, CompletionRequest, OpenRouterProvider, RawCompletion,
};

// Re-export CLI types
pub use cli::{Cli, Commands, OutputFormat};
