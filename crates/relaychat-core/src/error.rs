//! Error types for the session core.
//!
//! Only locally detectable mistakes are errors here. Connection failures,
//! relay rejections and malformed frames are state transitions, not errors:
//! they resolve to `Simulated` or `Disconnected` inside the controller.

use thiserror::Error;

use crate::session::SessionState;

/// Display name failed local validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Name is empty after trimming.
    #[error("display name is empty")]
    Empty,

    /// Name is shorter than the minimum after trimming.
    #[error("display name must be at least {min} characters, got {len}")]
    TooShort {
        /// Length in characters after trimming.
        len: usize,
        /// Minimum accepted length.
        min: usize,
    },

    /// Name is longer than the maximum after trimming.
    #[error("display name must be at most {max} characters, got {len}")]
    TooLong {
        /// Length in characters after trimming.
        len: usize,
        /// Maximum accepted length.
        max: usize,
    },
}

/// Errors returned by [`crate::SessionController::join`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The supplied identity is invalid.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A session is already in progress.
    #[error("cannot join while {state}")]
    AlreadyJoined {
        /// State the controller was in.
        state: SessionState,
    },
}

/// Simulation script failed validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScriptError {
    /// A scripted delay is zero.
    #[error("scripted message {index} has a zero delay")]
    ZeroDelay {
        /// Position in the script.
        index: usize,
    },

    /// Delays must strictly increase so deliveries stay ordered.
    #[error("scripted message {index} is not later than the one before it")]
    NonIncreasingDelay {
        /// Position in the script.
        index: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_describe_limits() {
        let err = ValidationError::TooShort { len: 1, min: 2 };
        assert_eq!(err.to_string(), "display name must be at least 2 characters, got 1");

        let err = SessionError::from(ValidationError::Empty);
        assert_eq!(err.to_string(), "display name is empty");
    }

    #[test]
    fn already_joined_names_state() {
        let err = SessionError::AlreadyJoined { state: SessionState::Live };
        assert_eq!(err.to_string(), "cannot join while live");
    }
}
