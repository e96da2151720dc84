//! Observable state snapshots for invariant checking.
//!
//! Snapshots capture what a session looks like at a point in time, either
//! from a [`SessionController`] directly or from an observer trace. Invariants
//! operate on snapshots rather than live state so checks are atomic.

use relaychat_core::{SessionController, SessionState};

use crate::Observed;

/// Controller internals, present when the snapshot was taken from a
/// [`SessionController`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControllerView {
    /// Current display name.
    pub identity: Option<String>,
    /// Current members.
    pub roster: Vec<String>,
    /// Scripted messages still to deliver.
    pub pending_scripted: usize,
    /// Attempt generation.
    pub generation: u64,
}

/// Snapshot of one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// Session state.
    pub state: SessionState,
    /// Controller internals, if captured.
    pub controller: Option<ControllerView>,
    /// Observer callbacks seen so far.
    pub trace: Vec<Observed>,
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self { state: SessionState::Disconnected, controller: None, trace: Vec::new() }
    }
}

impl SessionSnapshot {
    /// Snapshot of a fresh session.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Capture a controller.
    pub fn from_session(session: &SessionController) -> Self {
        let controller = ControllerView {
            identity: session.identity().map(|i| i.name().to_owned()),
            roster: session.roster().members().to_vec(),
            pending_scripted: session.pending_scripted(),
            generation: session.generation(),
        };
        Self { state: session.state(), controller: Some(controller), trace: Vec::new() }
    }

    /// Build from an observer trace. The state is the last one reported.
    pub fn from_trace(trace: Vec<Observed>) -> Self {
        let state = trace
            .iter()
            .rev()
            .find_map(|e| match e {
                Observed::State { to, .. } => Some(*to),
                _ => None,
            })
            .unwrap_or(SessionState::Disconnected);
        Self { state, controller: None, trace }
    }

    /// Attach an observer trace.
    #[must_use]
    pub fn with_trace(mut self, trace: Vec<Observed>) -> Self {
        self.trace = trace;
        self
    }
}
