//! CLI error type.

use relaychat_app::HandleError;
use thiserror::Error;

/// Errors that end the CLI.
#[derive(Error, Debug)]
pub enum CliError {
    /// Reading input or writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The session runtime stopped unexpectedly.
    #[error(transparent)]
    Session(#[from] HandleError),

    /// The runtime task panicked or was cancelled.
    #[error("session task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
