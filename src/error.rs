//! Error taxonomy of the shell.
//!
//! Every variant except [`ShellError::Input`] is recoverable: the dispatcher
//! prints it on the error stream and the loop keeps going.

use std::io;
use std::path::PathBuf;

/// Result alias used by commands and the loop.
pub type Result<T> = std::result::Result<T, ShellError>;

#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error("cd: expected argument")]
    MissingCdArgument,

    #[error("cd: {target}: {source}")]
    ChangeDir {
        target: String,
        #[source]
        source: io::Error,
    },

    #[error("cd: {}: Not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("Error: '{name}' is not a recognized command.\nTip: Type 'help' to see available commands.")]
    CommandNotFound { name: String },

    #[error("{name}: failed to start: {source}")]
    Spawn {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("{name}: failed to wait for process: {source}")]
    Wait {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to run {program}: {source}")]
    BackendSpawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("ai: output stream failed: {0}")]
    BackendStream(#[source] io::Error),

    #[error("ai: prompt is {len} bytes, at most {capacity} are allowed")]
    PromptTooLong { len: usize, capacity: usize },

    #[error("write failed: {0}")]
    Output(#[from] io::Error),

    /// A line arrived but could not be decoded; it is dropped.
    #[error("readline: line discarded: {0}")]
    UndecodableLine(#[source] io::Error),

    /// The input stream became unreadable. The only fatal error.
    #[error("readline: {0}")]
    Input(#[source] io::Error),
}

impl ShellError {
    /// Whether the shell must terminate after this error.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ShellError::Input(_))
    }
}
