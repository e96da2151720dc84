//! Presentation-facing triggers.

use relaychat_core::{ValidationError, identity};
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors returned by [`SessionHandle`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandleError {
    /// The display name failed local validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The runtime has stopped.
    #[error("session runtime has stopped")]
    Closed,
}

/// Commands queued for the runtime task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Command {
    Join { name: String, password: Option<String> },
    Send(String),
    Leave,
    Shutdown,
}

/// Cloneable handle for driving a [`crate::Runtime`].
///
/// Every method returns immediately. Outcomes are reported through the
/// runtime's [`crate::SessionObserver`].
#[derive(Debug, Clone)]
pub struct SessionHandle {
    commands: mpsc::UnboundedSender<Command>,
}

impl SessionHandle {
    pub(crate) fn new(commands: mpsc::UnboundedSender<Command>) -> Self {
        Self { commands }
    }

    /// Start a session.
    ///
    /// The name is validated here, synchronously; connecting (or falling back
    /// to simulated mode) happens on the runtime task.
    pub fn join(&self, name: &str, password: Option<&str>) -> Result<(), HandleError> {
        identity::validate_name(name)?;
        self.submit(Command::Join {
            name: name.to_owned(),
            password: password.map(str::to_owned),
        })
    }

    /// Post a message. Blank text is ignored by the session.
    pub fn send_message(&self, text: &str) -> Result<(), HandleError> {
        self.submit(Command::Send(text.to_owned()))
    }

    /// End the session. A no-op when not joined.
    pub fn leave(&self) -> Result<(), HandleError> {
        self.submit(Command::Leave)
    }

    /// Leave and stop the runtime.
    pub fn shutdown(&self) -> Result<(), HandleError> {
        self.submit(Command::Shutdown)
    }

    fn submit(&self, command: Command) -> Result<(), HandleError> {
        self.commands.send(command).map_err(|_| HandleError::Closed)
    }
}
