//! CLI command implementations.
//!
//! Contains the business logic for each CLI command.

use crate::chat::{ChatHistory, TurnOutcome, TurnPipeline};
use crate::cli::output::{
    OutputFormat, format_clean, format_models, format_reply_json, format_transcript,
};
use crate::cli::parser::{Cli, Commands, ModelArgs};
use crate::cli::repl::{REPL_HELP, ReplCommand};
use crate::config::ChatConfig;
use crate::error::{CommandError, Error, IoError, Result};
use crate::provider::{
    CompletionParams, CompletionProvider, MODEL_CATALOG, OpenRouterProvider, resolve_model_id,
};
use crate::reveal::{IncrementalRevealer, MemorySink, TerminalSink};
use std::io::{self, Read, Write};
use std::path::Path;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Executes the CLI command.
///
/// # Arguments
///
/// * `cli` - Parsed CLI arguments.
///
/// # Returns
///
/// Result with output string on success. Interactive commands write to the
/// terminal directly and return what is left to print.
///
/// # Errors
///
/// Returns an error if the command fails to execute.
pub fn execute(cli: &Cli) -> Result<String> {
    let format = OutputFormat::parse(&cli.format);

    match &cli.command {
        Commands::Models => cmd_models(cli, format),
        Commands::Clean { text } => cmd_clean(cli, text.as_deref(), format),
        Commands::Ask {
            prompt,
            model,
            no_reveal,
        } => cmd_ask(cli, prompt.as_deref(), model, *no_reveal, format),
        Commands::Chat {
            model,
            resume,
            save,
        } => cmd_chat(cli, model, resume.as_deref(), save.as_deref()),
    }
}

fn cmd_models(cli: &Cli, format: OutputFormat) -> Result<String> {
    // A broken config should not hide the catalog.
    let current = ChatConfig::load(cli.config.as_deref())
        .ok()
        .and_then(|config| resolve_model_id(&config.model).ok());
    Ok(format_models(MODEL_CATALOG, current.as_deref(), format))
}

fn cmd_clean(cli: &Cli, text: Option<&str>, format: OutputFormat) -> Result<String> {
    let config = ChatConfig::load(cli.config.as_deref())?;
    let raw = match text {
        Some(text) => text.to_string(),
        None => read_stdin()?,
    };
    let cleaned = config.sanitizer().clean(&raw);
    Ok(format_clean(&raw, &cleaned, format))
}

fn cmd_ask(
    cli: &Cli,
    prompt: Option<&str>,
    overrides: &ModelArgs,
    no_reveal: bool,
    format: OutputFormat,
) -> Result<String> {
    let config = cli.load_config(overrides)?;
    let prompt = match prompt {
        Some(prompt) => prompt.to_string(),
        None => read_stdin()?,
    };
    let prompt = prompt.trim();
    if prompt.is_empty() {
        return Err(CommandError::MissingArgument("PROMPT".to_string()).into());
    }

    let params = config.params()?;
    let provider = OpenRouterProvider::with_base(&config.api_base, config.require_api_key()?);
    let revealer = if no_reveal || format == OutputFormat::Json {
        IncrementalRevealer::new(Duration::ZERO).with_cursor(config.cursor.clone())
    } else {
        config.revealer()
    };
    let pipeline = TurnPipeline::new(&provider)
        .with_sanitizer(config.sanitizer())
        .with_revealer(revealer);

    let runtime = build_runtime()?;
    runtime.block_on(ask_turn(&pipeline, prompt, &params, &config.cursor, format))
}

/// Runs a single turn on a fresh history and renders it in `format`.
async fn ask_turn(
    pipeline: &TurnPipeline<'_>,
    prompt: &str,
    params: &CompletionParams,
    cursor: &str,
    format: OutputFormat,
) -> Result<String> {
    let mut history = ChatHistory::new();
    let cancel = CancellationToken::new();
    let watcher = spawn_interrupt_watcher(cancel.clone());

    let result = match format {
        OutputFormat::Text => {
            let mut sink = TerminalSink::with_cursor(io::stdout(), cursor);
            pipeline
                .run(&mut history, prompt, params, &mut sink, &cancel)
                .await
                .map(|outcome| (outcome, String::new()))
        }
        OutputFormat::Json => {
            let mut sink = MemorySink::new();
            pipeline
                .run(&mut history, prompt, params, &mut sink, &cancel)
                .await
                .map(|outcome| {
                    let json = outcome.content().map_or_else(String::new, |content| {
                        format_reply_json(&params.model_id, content, sink.frames())
                    });
                    (outcome, json)
                })
        }
    };
    watcher.abort();

    match result? {
        (TurnOutcome::Completed { .. }, output) => Ok(output),
        (TurnOutcome::Cancelled, _) => Err(CommandError::Cancelled.into()),
    }
}

fn cmd_chat(
    cli: &Cli,
    overrides: &ModelArgs,
    resume: Option<&Path>,
    save: Option<&Path>,
) -> Result<String> {
    let mut config = cli.load_config(overrides)?;
    let provider = OpenRouterProvider::with_base(&config.api_base, config.require_api_key()?);
    let mut history = match resume {
        Some(path) => load_transcript(path)?,
        None => ChatHistory::new(),
    };

    let runtime = build_runtime()?;
    let session = runtime.block_on(async {
        let (mut interrupts, forwarder) = forward_interrupts();
        let input = BufReader::new(tokio::io::stdin());
        let result = chat_loop(
            &mut config,
            &mut history,
            &provider,
            input,
            &mut io::stdout(),
            &mut interrupts,
        )
        .await;
        forwarder.abort();
        result
    });

    finish_session(session, &history, save)
}

/// Saves the transcript if requested, even when the session failed.
///
/// A session error takes precedence over a save error.
fn finish_session(
    session: Result<()>,
    history: &ChatHistory,
    save: Option<&Path>,
) -> Result<String> {
    let saved = save.map(|path| (path, save_transcript(path, history)));

    if let Err(e) = session {
        match &saved {
            Some((path, Ok(()))) => {
                warn!(error = %e, path = %path.display(), "session failed; transcript saved");
            }
            Some((_, Err(save_err))) => {
                warn!(error = %save_err, "session failed; transcript not saved");
            }
            None => {}
        }
        return Err(e);
    }

    match saved {
        Some((path, result)) => {
            result?;
            Ok(format!(
                "Saved {} turns to {}\n",
                history.len(),
                path.display()
            ))
        }
        None => Ok(String::new()),
    }
}

/// Reads prompts from `input` until `:quit`, end of input, or an interrupt at
/// the prompt. Replies and notices go to `out`.
///
/// Each message from `interrupts` cancels the turn in progress; one received
/// while waiting for input ends the session.
async fn chat_loop<R, W>(
    config: &mut ChatConfig,
    history: &mut ChatHistory,
    provider: &dyn CompletionProvider,
    input: R,
    out: &mut W,
    interrupts: &mut UnboundedReceiver<()>,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();

    writeln!(
        out,
        "Chatting with {} ({} turns loaded). Type :help for commands.",
        config.model,
        history.len()
    )?;

    loop {
        write!(out, "> ")?;
        out.flush()?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            Some(()) = interrupts.recv() => {
                writeln!(out)?;
                break;
            }
        };
        let Some(line) = line else {
            writeln!(out)?;
            break;
        };

        match ReplCommand::parse(&line) {
            ReplCommand::Empty => {}
            ReplCommand::Quit => break,
            ReplCommand::Clear => {
                history.clear();
                writeln!(out, "History cleared.")?;
            }
            ReplCommand::Models => {
                let current = resolve_model_id(&config.model).ok();
                write!(
                    out,
                    "{}",
                    format_models(MODEL_CATALOG, current.as_deref(), OutputFormat::Text)
                )?;
            }
            ReplCommand::Help => write!(out, "{REPL_HELP}")?,
            ReplCommand::Model(name) => match resolve_model_id(&name) {
                Ok(id) => {
                    config.model = name;
                    writeln!(out, "Model set to {id}.")?;
                }
                Err(e) => writeln!(out, "{e}")?,
            },
            ReplCommand::Temperature(value) => {
                config.temperature = value;
                writeln!(out, "Temperature set to {value}.")?;
            }
            ReplCommand::Invalid(message) => writeln!(out, "{message}")?,
            ReplCommand::Message(text) => {
                run_chat_turn(config, history, provider, &text, out, interrupts).await?;
            }
        }
    }

    debug!(turns = history.len(), messages = history.message_count(), "chat ended");
    Ok(())
}

/// Runs one interactive turn. Provider failures are reported and the session
/// continues; display failures end it.
async fn run_chat_turn<W: Write>(
    config: &ChatConfig,
    history: &mut ChatHistory,
    provider: &dyn CompletionProvider,
    text: &str,
    out: &mut W,
    interrupts: &mut UnboundedReceiver<()>,
) -> Result<()> {
    let params = config.params()?;
    let pipeline = TurnPipeline::new(provider)
        .with_sanitizer(config.sanitizer())
        .with_revealer(config.revealer());
    let cancel = CancellationToken::new();

    let result = {
        let mut sink = TerminalSink::with_cursor(&mut *out, config.cursor.clone());
        let run = pipeline.run(history, text, &params, &mut sink, &cancel);
        tokio::pin!(run);
        loop {
            tokio::select! {
                biased;
                result = &mut run => break result,
                Some(()) = interrupts.recv() => cancel.cancel(),
            }
        }
    };

    match result {
        Ok(TurnOutcome::Completed { .. }) => Ok(()),
        Ok(TurnOutcome::Cancelled) => {
            writeln!(out, "\n[cancelled]")?;
            Ok(())
        }
        Err(Error::Provider(e)) => {
            warn!(error = %e, "turn failed");
            writeln!(out, "Error: {e}")?;
            Ok(())
        }
        Err(e) => Err(e),
    }
}

/// Forwards every Ctrl-C as a message until the receiver is dropped.
fn forward_interrupts() -> (UnboundedReceiver<()>, JoinHandle<()>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let handle = tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            if tx.send(()).is_err() {
                break;
            }
        }
    });
    (rx, handle)
}

/// Cancels `token` on the next Ctrl-C.
fn spawn_interrupt_watcher(token: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            token.cancel();
        }
    })
}

fn build_runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| CommandError::ExecutionFailed(format!("failed to start runtime: {e}")).into())
}

fn read_stdin() -> Result<String> {
    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .map_err(|e| IoError::ReadFailed {
            path: "<stdin>".to_string(),
            reason: e.to_string(),
        })?;
    Ok(buffer)
}

/// Loads a transcript written by `--save`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a transcript.
pub fn load_transcript(path: &Path) -> Result<ChatHistory> {
    let content = std::fs::read_to_string(path).map_err(|e| IoError::ReadFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    serde_json::from_str(&content).map_err(|e| {
        CommandError::InvalidArgument(format!("{} is not a transcript: {e}", path.display()))
            .into()
    })
}

/// Writes `history` as pretty JSON.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn save_transcript(path: &Path, history: &ChatHistory) -> Result<()> {
    std::fs::write(path, format_transcript(history)).map_err(|e| {
        IoError::WriteFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}
