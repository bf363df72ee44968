//! Error types for the `bridge` core library.

use thiserror::Error;

/// Result type alias using the bridge [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for bridge operations.
#[derive(Debug, Error)]
pub enum Error {
    /// No program was given to run.
    #[error("no command given: expected <program> [args...]")]
    InvalidCommand,

    /// The child process could not be started. Fatal: there is no child
    /// to ever produce a normal exit code.
    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    /// I/O error after a successful spawn.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Process exit code for this failure class.
    ///
    /// A missing command is a usage error (2); a failed spawn uses the
    /// shell convention for a command that cannot be run (127); anything
    /// after a successful spawn is a generic failure (1).
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidCommand => 2,
            Self::Spawn { .. } => 127,
            Self::Io(_) => 1,
        }
    }
}
