//! CLI layer for lunga-rs.
//!
//! Provides the command-line interface using clap, with commands for
//! interactive chat, one-shot prompts, offline cleaning, and model listing.

pub mod commands;
pub mod output;
pub mod parser;
pub mod repl;

pub use commands::execute;
pub use output::OutputFormat;
pub use parser::{Cli, Commands, ModelArgs};
pub use repl::ReplCommand;
