//! Simulation driver implementing the Driver trait.
//!
//! `SimDriver` stands in for the WebSocket driver in tests. It implements
//! [`Driver`] so the same [`relaychat_app::Runtime`] orchestration code runs
//! in both production and simulation.
//!
//! A reachable driver behaves like a small relay: it answers `join` with the
//! member list (or a rejection when the name is taken), echoes `message`
//! frames back and forgets members on `leave`. Tests can switch that off with
//! [`SimDriver::silent`] and inject frames by hand.
//!
//! The driver is cheaply cloneable. Keep a clone to steer the relay after the
//! original has moved into the runtime.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use relaychat_app::Driver;
use serde_json::{Value, json};
use tokio::sync::Notify;

/// Error type for simulation driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimDriverError(pub String);

impl std::fmt::Display for SimDriverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SimDriverError: {}", self.0)
    }
}

impl std::error::Error for SimDriverError {}

/// How the simulated relay answers connection attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RelayMode {
    /// Connections succeed.
    #[default]
    Reachable,
    /// Connections are refused immediately.
    Unreachable,
    /// Connections never complete.
    Hang,
}

/// Rejection reason sent for duplicate names.
pub const NAME_TAKEN: &str = "Username already taken";

#[derive(Default)]
struct SharedState {
    mode: RelayMode,
    auto_reply: bool,
    fail_sends: bool,
    connected: bool,
    /// Names present on the relay, in join order.
    members: Vec<String>,
    /// Name joined over the current connection.
    session_name: Option<String>,
    incoming: VecDeque<String>,
    outgoing: Vec<String>,
    connect_attempts: Vec<String>,
}

impl SharedState {
    /// React to a client frame the way the relay would.
    fn respond(&mut self, frame: &str) {
        let Ok(value) = serde_json::from_str::<Value>(frame) else {
            return;
        };
        let text = |key: &str| value.get(key).and_then(Value::as_str).map(str::to_owned);

        match value.get("type").and_then(Value::as_str) {
            Some("join") => {
                let Some(name) = text("username") else { return };
                if self.members.contains(&name) {
                    tracing::debug!(%name, "sim relay rejecting taken name");
                    self.push(&json!({ "type": "error", "error": NAME_TAKEN }));
                    return;
                }
                tracing::debug!(%name, "sim relay accepted join");
                self.members.push(name.clone());
                self.session_name = Some(name);
                let roster = json!({ "type": "userList", "users": self.members });
                self.push(&roster);
            },
            Some("message") => {
                if let (Some(username), Some(content)) = (text("username"), text("content")) {
                    tracing::debug!(%username, "sim relay echoing message");
                    self.push(&json!({
                        "type": "message",
                        "username": username,
                        "content": content,
                    }));
                }
            },
            Some("leave") => {
                if let Some(name) = text("username") {
                    self.members.retain(|m| *m != name);
                }
                self.session_name = None;
            },
            _ => {},
        }
    }

    fn push(&mut self, frame: &Value) {
        self.incoming.push_back(frame.to_string());
    }

    fn drop_session(&mut self) {
        self.connected = false;
        if let Some(name) = self.session_name.take() {
            self.members.retain(|m| *m != name);
        }
    }
}

/// Simulation driver for deterministic testing.
#[derive(Clone)]
pub struct SimDriver {
    state: Arc<Mutex<SharedState>>,
    notify: Arc<Notify>,
}

impl Default for SimDriver {
    fn default() -> Self {
        Self::reachable()
    }
}

impl SimDriver {
    fn with_mode(mode: RelayMode) -> Self {
        let state = SharedState { mode, auto_reply: true, ..SharedState::default() };
        Self { state: Arc::new(Mutex::new(state)), notify: Arc::new(Notify::new()) }
    }

    /// Relay that accepts connections and answers like a real one.
    pub fn reachable() -> Self {
        Self::with_mode(RelayMode::Reachable)
    }

    /// Relay that refuses every connection.
    pub fn unreachable() -> Self {
        Self::with_mode(RelayMode::Unreachable)
    }

    /// Relay whose connections never complete.
    pub fn hanging() -> Self {
        Self::with_mode(RelayMode::Hang)
    }

    /// Seed names already present on the relay.
    #[must_use]
    pub fn with_members<I, S>(self, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lock().members.extend(members.into_iter().map(Into::into));
        self
    }

    /// Disable automatic replies. Frames then only arrive via
    /// [`SimDriver::inject_frame`].
    #[must_use]
    pub fn silent(self) -> Self {
        self.lock().auto_reply = false;
        self
    }

    /// Change how future connection attempts are answered.
    pub fn set_mode(&self, mode: RelayMode) {
        self.lock().mode = mode;
    }

    /// Make every subsequent send fail.
    pub fn fail_sends(&self) {
        self.lock().fail_sends = true;
    }

    /// Queue a raw frame from the relay.
    pub fn inject_frame(&self, frame: impl Into<String>) {
        self.lock().incoming.push_back(frame.into());
        self.notify.notify_one();
    }

    /// Close the connection from the relay side. Frames already queued are
    /// still delivered.
    pub fn close_remote(&self) {
        self.lock().drop_session();
        self.notify.notify_one();
    }

    /// Take all captured outgoing frames.
    pub fn take_outgoing(&self) -> Vec<String> {
        std::mem::take(&mut self.lock().outgoing)
    }

    /// URLs of every connection attempt so far.
    pub fn connect_attempts(&self) -> Vec<String> {
        self.lock().connect_attempts.clone()
    }

    /// Names currently present on the relay.
    pub fn members(&self) -> Vec<String> {
        self.lock().members.clone()
    }

    fn lock(&self) -> MutexGuard<'_, SharedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Driver for SimDriver {
    type Error = SimDriverError;

    async fn connect(&mut self, url: &str) -> Result<(), Self::Error> {
        let mode = {
            let mut state = self.lock();
            state.connect_attempts.push(url.to_owned());
            state.mode
        };

        match mode {
            RelayMode::Reachable => {
                let mut state = self.lock();
                state.connected = true;
                state.incoming.clear();
                Ok(())
            },
            RelayMode::Unreachable => {
                tracing::debug!(url, "sim relay refusing connection");
                Err(SimDriverError("connection refused".into()))
            },
            RelayMode::Hang => std::future::pending().await,
        }
    }

    async fn send_text(&mut self, frame: String) -> Result<(), Self::Error> {
        {
            let mut state = self.lock();
            if !state.connected {
                return Err(SimDriverError("not connected".into()));
            }
            if state.fail_sends {
                return Err(SimDriverError("broken pipe".into()));
            }
            if state.auto_reply {
                state.respond(&frame);
            }
            state.outgoing.push(frame);
        }
        self.notify.notify_one();
        Ok(())
    }

    async fn recv_text(&mut self) -> Option<String> {
        loop {
            {
                let mut state = self.lock();
                if let Some(frame) = state.incoming.pop_front() {
                    return Some(frame);
                }
                if !state.connected {
                    return None;
                }
            }
            self.notify.notified().await;
        }
    }

    fn is_connected(&self) -> bool {
        let state = self.lock();
        state.connected || !state.incoming.is_empty()
    }

    fn close(&mut self) {
        let mut state = self.lock();
        state.drop_session();
        state.incoming.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unreachable_refuses() {
        let mut driver = SimDriver::unreachable();

        let result = driver.connect("ws://relay").await;

        assert!(result.is_err());
        assert_eq!(driver.connect_attempts(), vec!["ws://relay".to_string()]);
        assert!(!driver.is_connected());
    }

    #[tokio::test]
    async fn join_answers_with_member_list() {
        let mut driver = SimDriver::reachable().with_members(["Cy"]);
        driver.connect("ws://relay").await.unwrap();

        driver.send_text(r#"{"type":"join","username":"Al"}"#.into()).await.unwrap();

        assert_eq!(
            driver.recv_text().await.unwrap(),
            r#"{"type":"userList","users":["Cy","Al"]}"#
        );
    }

    #[tokio::test]
    async fn taken_name_is_rejected() {
        let mut driver = SimDriver::reachable().with_members(["Al"]);
        driver.connect("ws://relay").await.unwrap();

        driver.send_text(r#"{"type":"join","username":"Al"}"#.into()).await.unwrap();

        let frame = driver.recv_text().await.unwrap();
        assert!(frame.contains(NAME_TAKEN));
        assert_eq!(driver.members(), vec!["Al".to_string()]);
    }

    #[tokio::test]
    async fn close_forgets_session_member() {
        let mut driver = SimDriver::reachable();
        driver.connect("ws://relay").await.unwrap();
        driver.send_text(r#"{"type":"join","username":"Al"}"#.into()).await.unwrap();

        driver.close();

        assert!(driver.members().is_empty());
        assert!(driver.recv_text().await.is_none());
    }

    #[tokio::test]
    async fn remote_close_drains_queue_first() {
        let mut driver = SimDriver::reachable().silent();
        driver.connect("ws://relay").await.unwrap();
        driver.inject_frame("one");

        driver.close_remote();

        assert_eq!(driver.recv_text().await.as_deref(), Some("one"));
        assert!(driver.recv_text().await.is_none());
    }

    #[tokio::test]
    async fn sends_fail_when_disconnected() {
        let mut driver = SimDriver::reachable();

        let result = driver.send_text("{}".into()).await;

        assert_eq!(result, Err(SimDriverError("not connected".into())));
    }
}
