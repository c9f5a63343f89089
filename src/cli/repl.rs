//! Interactive chat input handling.
//!
//! Lines starting with `:` are session commands; everything else is sent to
//! the model.

/// Help text printed by `:help`.
pub const REPL_HELP: &str = "\
Commands:
  :quit, :exit      leave the session
  :clear            clear the chat history
  :models           list available models
  :model NAME       switch model (display name or id)
  :temp X           set temperature (0.0 to 1.0)
  :help             show this help
Anything else is sent to the model.
";

/// One parsed line of REPL input.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplCommand {
    /// Blank line.
    Empty,
    /// Leave the session.
    Quit,
    /// Clear history and message count.
    Clear,
    /// List models.
    Models,
    /// Show help.
    Help,
    /// Switch model.
    Model(String),
    /// Change temperature.
    Temperature(f32),
    /// A chat message.
    Message(String),
    /// A malformed command, with the reason.
    Invalid(String),
}

impl ReplCommand {
    /// Parses one input line.
    #[must_use]
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Self::Empty;
        }
        let Some(command) = line.strip_prefix(':') else {
            return Self::Message(line.to_string());
        };

        let (name, arg) = command
            .split_once(char::is_whitespace)
            .map_or((command, ""), |(n, a)| (n, a.trim()));

        match name {
            "quit" | "exit" | "q" => Self::Quit,
            "clear" => Self::Clear,
            "models" => Self::Models,
            "help" | "h" => Self::Help,
            "model" if arg.is_empty() => Self::Invalid("usage: :model NAME".to_string()),
            "model" => Self::Model(arg.to_string()),
            "temp" | "temperature" => match arg.parse::<f32>() {
                Ok(value) if (0.0..=1.0).contains(&value) => Self::Temperature(value),
                _ => Self::Invalid(format!("temperature must be within [0, 1], got '{arg}'")),
            },
            other => Self::Invalid(format!("unknown command ':{other}' (try :help)")),
        }
    }
}
