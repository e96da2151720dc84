//! Observer that records every callback with its (virtual) arrival time.

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use relaychat_app::SessionObserver;
use relaychat_core::SessionState;
use tokio::time::Instant;

/// One observer callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observed {
    /// `on_message`
    Message {
        /// Message author.
        author: String,
        /// Message text.
        content: String,
    },
    /// `on_roster_changed`
    Roster(Vec<String>),
    /// `on_rejected`
    Rejected(String),
    /// `on_connection_state_changed`
    Connection(bool),
    /// `on_state_changed`
    State {
        /// Previous state.
        from: SessionState,
        /// New state.
        to: SessionState,
    },
}

/// A callback and when it arrived, relative to observer creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recorded {
    /// Time since the observer was created.
    pub at: Duration,
    /// The callback.
    pub event: Observed,
}

/// Shared, cloneable recording observer.
///
/// Clone before handing one copy to the runtime; the clones share a log.
#[derive(Clone)]
pub struct RecordingObserver {
    started: Instant,
    log: Arc<Mutex<Vec<Recorded>>>,
}

impl Default for RecordingObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingObserver {
    /// Start recording now.
    pub fn new() -> Self {
        Self { started: Instant::now(), log: Arc::new(Mutex::new(Vec::new())) }
    }

    /// Everything recorded so far.
    pub fn recorded(&self) -> Vec<Recorded> {
        self.lock().clone()
    }

    /// Callbacks without timing.
    pub fn events(&self) -> Vec<Observed> {
        self.lock().iter().map(|r| r.event.clone()).collect()
    }

    /// `(author, content)` of every delivered message.
    pub fn messages(&self) -> Vec<(String, String)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Observed::Message { author, content } => Some((author, content)),
                _ => None,
            })
            .collect()
    }

    /// Most recent member list, if any.
    pub fn last_roster(&self) -> Option<Vec<String>> {
        self.events().into_iter().rev().find_map(|e| match e {
            Observed::Roster(members) => Some(members),
            _ => None,
        })
    }

    /// Every liveness flip, in order.
    pub fn connection_changes(&self) -> Vec<bool> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Observed::Connection(live) => Some(live),
                _ => None,
            })
            .collect()
    }

    /// Every state a transition ended in, in order.
    pub fn states(&self) -> Vec<SessionState> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Observed::State { to, .. } => Some(to),
                _ => None,
            })
            .collect()
    }

    /// Last state reached, or `Disconnected` if none recorded.
    pub fn current_state(&self) -> SessionState {
        self.states().last().copied().unwrap_or(SessionState::Disconnected)
    }

    fn record(&self, event: Observed) {
        let at = self.started.elapsed();
        self.lock().push(Recorded { at, event });
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Recorded>> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SessionObserver for RecordingObserver {
    fn on_message(&mut self, author: &str, content: &str) {
        self.record(Observed::Message { author: author.to_owned(), content: content.to_owned() });
    }

    fn on_roster_changed(&mut self, members: &[String]) {
        self.record(Observed::Roster(members.to_vec()));
    }

    fn on_rejected(&mut self, reason: &str) {
        self.record(Observed::Rejected(reason.to_owned()));
    }

    fn on_connection_state_changed(&mut self, is_live: bool) {
        self.record(Observed::Connection(is_live));
    }

    fn on_state_changed(&mut self, from: SessionState, to: SessionState) {
        self.record(Observed::State { from, to });
    }
}
