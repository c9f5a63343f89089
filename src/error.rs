//! Error types for lunga-rs operations.
//!
//! This module provides the error hierarchy using `thiserror` for the
//! completion provider, the reveal sinks, configuration, file I/O, and CLI
//! commands. Response sanitizing is total and has no error kind.

use thiserror::Error;

/// Result type alias for lunga-rs operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type.
#[derive(Error, Debug)]
pub enum Error {
    /// The completion provider failed or rejected the request.
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    /// A display sink rejected a reveal frame.
    #[error("display error: {0}")]
    Sink(#[from] SinkWriteError),

    /// I/O errors (config and transcript files).
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// CLI command errors.
    #[error("command error: {0}")]
    Command(#[from] CommandError),

    /// Invalid state errors.
    #[error("invalid state: {message}")]
    InvalidState {
        /// Description of the invalid state.
        message: String,
    },

    /// Configuration errors.
    #[error("configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },
}

impl Error {
    /// Shorthand for a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

/// Errors returned by a completion provider.
///
/// None of these are retried; a failed turn has to be resubmitted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// A 2xx reply carrying an error object instead of a completion.
    #[error("{message}")]
    Api {
        /// Human-readable message from the provider.
        message: String,
    },

    /// Non-2xx reply.
    #[error("HTTP {status}: {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// The error object's message, else the body text, else the reason
        /// phrase.
        message: String,
    },

    /// Connection, TLS, or timeout failure, or an unreadable 2xx body.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The reply carried no completion text.
    #[error("provider returned an empty response")]
    EmptyResponse,

    /// The request could not be built (bad parameters).
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// A display sink refused a frame during reveal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("write of frame {frame} failed: {reason}")]
pub struct SinkWriteError {
    /// Zero-based index of the rejected frame.
    pub frame: usize,
    /// Why the sink failed.
    pub reason: String,
}

impl SinkWriteError {
    /// Creates a sink error for the given frame.
    pub fn new(frame: usize, reason: impl Into<String>) -> Self {
        Self {
            frame,
            reason: reason.into(),
        }
    }
}

/// I/O-specific errors for file operations.
#[derive(Error, Debug)]
pub enum IoError {
    /// Failed to read file.
    #[error("failed to read file: {path}: {reason}")]
    ReadFailed {
        /// Path to the file.
        path: String,
        /// Reason for failure.
        reason: String,
    },

    /// Failed to write file.
    #[error("failed to write file: {path}: {reason}")]
    WriteFailed {
        /// Path to the file.
        path: String,
        /// Reason for failure.
        reason: String,
    },

    /// Generic I/O error wrapper.
    #[error("I/O error: {0}")]
    Generic(String),
}

/// CLI command-specific errors.
#[derive(Error, Debug)]
pub enum CommandError {
    /// Invalid argument provided.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Missing required argument.
    #[error("missing required argument: {0}")]
    MissingArgument(String),

    /// Command execution failed.
    #[error("command execution failed: {0}")]
    ExecutionFailed(String),

    /// User cancelled operation.
    #[error("operation cancelled by user")]
    Cancelled,

    /// Output format error.
    #[error("output format error: {0}")]
    OutputFormat(String),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(IoError::Generic(err.to_string()))
    }
}

impl From<serde_json::Error> for CommandError {
    fn from(err: serde_json::Error) -> Self {
        Self::OutputFormat(err.to_string())
    }
}

/// Only the request builders produce these; HTTP failures are mapped where
/// the reply is read.
impl From<async_openai::error::OpenAIError> for ProviderError {
    fn from(err: async_openai::error::OpenAIError) -> Self {
        use async_openai::error::OpenAIError;

        match err {
            OpenAIError::InvalidArgument(msg) => Self::InvalidRequest(msg),
            other => Self::InvalidRequest(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::config("temperature must be within [0, 1]");
        assert_eq!(
            err.to_string(),
            "configuration error: temperature must be within [0, 1]"
        );
    }

    #[test]
    fn test_invalid_state_display() {
        let err = Error::InvalidState {
            message: "reveal task failed".to_string(),
        };
        assert_eq!(err.to_string(), "invalid state: reveal task failed");
    }

    #[test]
    fn test_provider_error_display() {
        let err = ProviderError::Http {
            status: 429,
            message: "rate limited".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 429: rate limited");

        let err = ProviderError::Api {
            message: "No endpoints found".to_string(),
        };
        assert_eq!(err.to_string(), "No endpoints found");

        let err = ProviderError::EmptyResponse;
        assert!(err.to_string().contains("empty response"));
    }

    #[test]
    fn test_sink_error_display() {
        let err = SinkWriteError::new(3, "broken pipe");
        assert_eq!(err.to_string(), "write of frame 3 failed: broken pipe");
    }

    #[test]
    fn test_io_error_variants() {
        let err = IoError::ReadFailed {
            path: "/tmp/config.json".to_string(),
            reason: "permission denied".to_string(),
        };
        assert!(err.to_string().contains("/tmp/config.json"));
        assert!(err.to_string().contains("permission denied"));

        let err = IoError::WriteFailed {
            path: "/tmp/out".to_string(),
            reason: "disk full".to_string(),
        };
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn test_command_error_variants() {
        let err = CommandError::InvalidArgument("--bad".to_string());
        assert!(err.to_string().contains("invalid argument"));

        let err = CommandError::MissingArgument("PROMPT".to_string());
        assert_eq!(err.to_string(), "missing required argument: PROMPT");

        let err = CommandError::Cancelled;
        assert!(err.to_string().contains("cancelled"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_error_from_provider() {
        let err: Error = ProviderError::EmptyResponse.into();
        assert!(matches!(err, Error::Provider(ProviderError::EmptyResponse)));
    }

    #[test]
    fn test_error_from_sink() {
        let err: Error = SinkWriteError::new(0, "closed").into();
        assert!(matches!(err, Error::Sink(_)));
    }

    #[test]
    fn test_from_openai_invalid_argument() {
        let err = async_openai::error::OpenAIError::InvalidArgument("bad model".to_string());
        let err: ProviderError = err.into();
        assert_eq!(err, ProviderError::InvalidRequest("bad model".to_string()));
    }

    #[test]
    fn test_from_serde_json_error_to_command_error() {
        let json_err: serde_json::Error = serde_json::from_str::<i32>("invalid").unwrap_err();
        let err: CommandError = json_err.into();
        assert!(matches!(err, CommandError::OutputFormat(_)));
    }
}
