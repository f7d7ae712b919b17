//! Error types for the ASCII protocol.

use thiserror::Error;

/// Errors returned by the strict command parser.
///
/// Reply parsing is deliberately lenient and never produces these; they only
/// arise when a line is interpreted as a command, as a simulated device does.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// The line does not start with a known command verb.
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// A required argument was not present.
    #[error("missing argument `{argument}` for `{command}`")]
    MissingArgument {
        /// Command verb.
        command: &'static str,
        /// Name of the absent argument.
        argument: &'static str,
    },

    /// An argument was present but could not be interpreted.
    #[error("invalid argument `{argument}` for `{command}`: {value}")]
    InvalidArgument {
        /// Command verb.
        command: &'static str,
        /// Name of the argument.
        argument: &'static str,
        /// The offending text.
        value: String,
    },

    /// The line contained bytes that are not valid UTF-8.
    #[error("invalid UTF-8 in command line")]
    InvalidUtf8,
}

/// Result type alias for strict protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;
