//! Command-line argument parsing.
//!
//! Defines the CLI structure using clap derive macros.

use crate::config::ChatConfig;
use crate::error::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// lunga-rs: chat with hosted language models from the terminal.
///
/// Replies are cleaned of model control tokens and revealed word by word.
#[derive(Parser, Debug)]
#[command(name = "lunga-rs")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to a JSON config file.
    ///
    /// Defaults to `lunga/config.json` in the platform config directory.
    #[arg(short, long, env = "LUNGA_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose (debug) logging on stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, default_value = "text", global = true)]
    pub format: String,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Model and pacing overrides shared by `chat` and `ask`.
#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct ModelArgs {
    /// Model display name or provider id.
    #[arg(short, long)]
    pub model: Option<String>,

    /// Sampling temperature (0.0 to 1.0).
    #[arg(short, long)]
    pub temperature: Option<f32>,

    /// Maximum tokens to generate.
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// Pause between revealed words in milliseconds.
    #[arg(long)]
    pub pace_ms: Option<u64>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start an interactive chat session.
    Chat {
        /// Model and pacing overrides.
        #[command(flatten)]
        model: ModelArgs,

        /// Resume from a saved transcript.
        #[arg(long)]
        resume: Option<PathBuf>,

        /// Save the transcript as JSON on exit.
        #[arg(long)]
        save: Option<PathBuf>,
    },

    /// Send a single prompt and reveal the reply.
    Ask {
        /// Prompt text (reads from stdin if not provided).
        prompt: Option<String>,

        /// Model and pacing overrides.
        #[command(flatten)]
        model: ModelArgs,

        /// Print the reply at once instead of word by word.
        #[arg(long)]
        no_reveal: bool,
    },

    /// Strip control tokens from text without calling a model.
    Clean {
        /// Text to clean (reads from stdin if not provided).
        text: Option<String>,
    },

    /// List the built-in models.
    #[command(alias = "ls")]
    Models,
}

impl Cli {
    /// Loads configuration and applies the environment and `overrides`.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file is unreadable or the resulting
    /// settings are invalid.
    pub fn load_config(&self, overrides: &ModelArgs) -> Result<ChatConfig> {
        let mut config = ChatConfig::load(self.config.as_deref())?;
        config.apply_env();
        apply_overrides(&mut config, overrides);
        config.validate()?;
        Ok(config)
    }
}

/// Applies command-line overrides on top of a loaded config.
pub fn apply_overrides(config: &mut ChatConfig, overrides: &ModelArgs) {
    if let Some(model) = &overrides.model {
        config.model.clone_from(model);
    }
    if let Some(temperature) = overrides.temperature {
        config.temperature = temperature;
    }
    if let Some(max_tokens) = overrides.max_tokens {
        config.max_tokens = max_tokens;
    }
    if let Some(pace_ms) = overrides.pace_ms {
        config.pace_ms = pace_ms;
    }
}
