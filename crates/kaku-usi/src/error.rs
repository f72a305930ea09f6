//! USI protocol errors.

use kaku_core::{MoveParseError, SfenError};

/// Errors that can occur during USI protocol handling.
#[derive(Debug, thiserror::Error)]
pub enum UsiError {
    /// The `position` command is missing the `startpos` or `sfen` keyword.
    #[error("malformed position command: missing startpos or sfen keyword")]
    MalformedPosition,

    /// Failed to parse an SFEN string.
    #[error("invalid SFEN {sfen:?}: {source}")]
    InvalidSfen {
        /// The SFEN string that failed to parse.
        sfen: String,
        /// Why it failed.
        source: SfenError,
    },

    /// A move in the `position` command could not be played.
    #[error("invalid move: {source}")]
    InvalidMove {
        /// Why the move was rejected.
        #[from]
        source: MoveParseError,
    },

    /// A parameter was given without its value.
    #[error("missing value for {param}")]
    MissingValue {
        /// The parameter name.
        param: String,
    },

    /// A parameter value could not be parsed.
    #[error("invalid value for {param}: {value}")]
    InvalidValue {
        /// The parameter name.
        param: String,
        /// The offending value.
        value: String,
    },

    /// `setoption` named an option the engine does not have.
    #[error("unknown option: {name}")]
    UnknownOption {
        /// The option name as sent.
        name: String,
    },

    /// An I/O error occurred while reading commands or writing replies.
    #[error("I/O error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}
