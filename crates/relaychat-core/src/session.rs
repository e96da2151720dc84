//! Session layer state machine.
//!
//! Owns the single logical session: identity, connection state, and the
//! choice between a relay-backed (`Live`) and a local (`Simulated`) session.
//! Uses the action pattern: methods take inputs and return actions for the
//! runtime to execute. No I/O happens here.
//!
//! # State Machine
//!
//! ```text
//!                  join               opened
//! ┌──────────────┐ ───> ┌────────────┐ ───> ┌──────┐
//! │ Disconnected │      │ Connecting │      │ Live │
//! └──────────────┘      └────────────┘      └──────┘
//!        ^                    │ failed/timeout  │ rejected
//!        │                    v                 v
//!        │              ┌────────┐         ┌────────┐
//!        │              │ Failed │         │ Failed │
//!        │              └────────┘         └────────┘
//!        │                    v                 │
//!        │  leave       ┌───────────┐           │
//!        ├──────────────│ Simulated │           │
//!        │              └───────────┘           │
//!        └──────────────────────────────────────┘
//!                  leave / closed / rejected
//! ```
//!
//! `Failed` is transient: it is announced and then left in the same step.
//!
//! # Generations
//!
//! Every join and every teardown bumps a generation counter. Transport
//! outcomes and scheduled deliveries carry the generation they were created
//! under; anything stale is ignored. This is what makes `leave()` final even
//! when a timer or frame was already in flight.

use std::{fmt, time::Duration};

use relaychat_proto::{InboundEvent, OutboundIntent};

use crate::{
    config::{ClientConfig, SimulationScript},
    error::SessionError,
    identity::Identity,
    roster::Roster,
    simulated::SimulatedSession,
};

/// Session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// No session.
    Disconnected,
    /// Waiting for the transport to open.
    Connecting,
    /// Backed by an open relay connection.
    Live,
    /// Backed by the local simulator.
    Simulated,
    /// Transient failure marker, announced on the way to another state.
    Failed,
}

impl SessionState {
    /// Whether the relay connection is open.
    pub fn is_live(self) -> bool {
        self == Self::Live
    }

    /// Whether outbound messages are accepted.
    pub fn can_send(self) -> bool {
        matches!(self, Self::Live | Self::Simulated)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Live => "live",
            Self::Simulated => "simulated",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Actions returned by the session state machine.
///
/// The runtime executes these in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    /// Open the relay transport and report the outcome with `generation`.
    Connect {
        /// Relay URL.
        url: String,
        /// Generation to echo back in the outcome event.
        generation: u64,
    },

    /// Encode and send this intent over the open transport.
    Send(OutboundIntent),

    /// Close the transport. Best effort, never reported back.
    CloseTransport,

    /// Hand this event to the observer.
    Deliver(InboundEvent),

    /// The session moved between states.
    StateChanged {
        /// Previous state.
        from: SessionState,
        /// New state.
        to: SessionState,
    },

    /// Feed [`SessionEvent::ScriptDue`] back after `delay`.
    Schedule {
        /// Generation to echo back.
        generation: u64,
        /// Script entry to deliver.
        index: usize,
        /// Delay from now.
        delay: Duration,
    },

    /// Drop every pending scheduled delivery.
    CancelScheduled,
}

/// Events the runtime feeds into the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The transport requested by [`SessionAction::Connect`] is open.
    TransportOpened {
        /// Generation from the connect action.
        generation: u64,
    },

    /// The transport could not be established.
    TransportFailed {
        /// Generation from the connect action.
        generation: u64,
        /// Human-readable cause, for logging.
        reason: String,
    },

    /// The open transport closed (remote close, I/O error, ...).
    TransportClosed {
        /// Generation the transport was opened under.
        generation: u64,
    },

    /// A text frame arrived from the relay.
    FrameReceived {
        /// Generation the transport was opened under.
        generation: u64,
        /// Raw frame text.
        frame: String,
    },

    /// A scheduled simulator delivery is due.
    ScriptDue {
        /// Generation from the schedule action.
        generation: u64,
        /// Script entry index.
        index: usize,
    },
}

/// Session controller.
///
/// Single owner of the session's identity and state. Pure: no I/O, no clock.
#[derive(Debug, Clone)]
pub struct SessionController {
    state: SessionState,
    identity: Option<Identity>,
    roster: Roster,
    generation: u64,
    simulation: Option<SimulatedSession>,
    relay_url: String,
    script: SimulationScript,
}

impl SessionController {
    /// Create a controller in [`SessionState::Disconnected`].
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            state: SessionState::Disconnected,
            identity: None,
            roster: Roster::default(),
            generation: 0,
            simulation: None,
            relay_url: config.endpoint.url(),
            script: config.script.clone(),
        }
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Current identity. `None` when disconnected.
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Last roster reported by the relay or simulator.
    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Current generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Scripted deliveries not yet made. Zero outside simulated mode.
    pub fn pending_scripted(&self) -> usize {
        self.simulation.as_ref().map_or(0, SimulatedSession::remaining)
    }

    /// Start a session.
    ///
    /// Validates locally, then returns the actions that move the session to
    /// `Connecting` and open the transport. The outcome arrives later as a
    /// [`SessionEvent`].
    ///
    /// # Errors
    ///
    /// - `SessionError::Validation` if the name is empty, too short or too long
    /// - `SessionError::AlreadyJoined` if not disconnected
    pub fn join(
        &mut self,
        name: &str,
        password: Option<&str>,
    ) -> Result<Vec<SessionAction>, SessionError> {
        let identity = Identity::new(name, password)?;
        if self.state != SessionState::Disconnected {
            return Err(SessionError::AlreadyJoined { state: self.state });
        }

        tracing::info!(name = identity.name(), url = %self.relay_url, "joining relay");

        self.generation = self.generation.wrapping_add(1);
        self.identity = Some(identity);

        let mut actions = Vec::new();
        self.transition(SessionState::Connecting, &mut actions);
        actions.push(SessionAction::Connect {
            url: self.relay_url.clone(),
            generation: self.generation,
        });
        Ok(actions)
    }

    /// Post a message.
    ///
    /// Blank text is ignored. Live sessions send a `Post` intent; simulated
    /// sessions echo the message locally right away. Ignored in any other
    /// state.
    pub fn send_message(&mut self, text: &str) -> Vec<SessionAction> {
        let content = text.trim();
        if content.is_empty() {
            return Vec::new();
        }

        let Some(identity) = &self.identity else {
            return Vec::new();
        };

        match self.state {
            SessionState::Live => vec![SessionAction::Send(OutboundIntent::Post {
                name: identity.name().to_owned(),
                content: content.to_owned(),
            })],
            SessionState::Simulated => match &self.simulation {
                Some(simulation) => vec![SessionAction::Deliver(simulation.local_post(content))],
                None => Vec::new(),
            },
            SessionState::Disconnected | SessionState::Connecting | SessionState::Failed => {
                tracing::debug!(state = %self.state, "dropping message outside a session");
                Vec::new()
            },
        }
    }

    /// End the session.
    ///
    /// Live sessions get a best-effort `Leave` intent before the transport is
    /// closed. Idempotent: a no-op when already disconnected.
    pub fn leave(&mut self) -> Vec<SessionAction> {
        let mut actions = Vec::new();

        match self.state {
            SessionState::Disconnected => return actions,
            SessionState::Live => {
                if let Some(identity) = &self.identity {
                    actions.push(SessionAction::Send(OutboundIntent::Leave {
                        name: identity.name().to_owned(),
                    }));
                }
                actions.push(SessionAction::CloseTransport);
            },
            SessionState::Connecting => actions.push(SessionAction::CloseTransport),
            SessionState::Simulated | SessionState::Failed => {
                actions.push(SessionAction::CancelScheduled);
            },
        }

        tracing::info!(state = %self.state, "leaving session");
        self.teardown(&mut actions);
        actions
    }

    /// Process a runtime event and return actions.
    pub fn handle(&mut self, event: SessionEvent) -> Vec<SessionAction> {
        match event {
            SessionEvent::TransportOpened { generation } => self.handle_opened(generation),
            SessionEvent::TransportFailed { generation, reason } => {
                self.handle_failed(generation, &reason)
            },
            SessionEvent::TransportClosed { generation } => self.handle_closed(generation),
            SessionEvent::FrameReceived { generation, frame } => {
                self.handle_frame(generation, &frame)
            },
            SessionEvent::ScriptDue { generation, index } => self.handle_due(generation, index),
        }
    }

    fn is_current(&self, generation: u64, state: SessionState) -> bool {
        generation == self.generation && self.state == state
    }

    fn handle_opened(&mut self, generation: u64) -> Vec<SessionAction> {
        if !self.is_current(generation, SessionState::Connecting) {
            tracing::debug!(generation, "ignoring stale transport open");
            // Nobody wants this connection any more
            if self.state.is_live() {
                return Vec::new();
            }
            return vec![SessionAction::CloseTransport];
        }

        let Some(identity) = &self.identity else {
            return Vec::new();
        };
        let join = OutboundIntent::Join {
            name: identity.name().to_owned(),
            password: identity.password().map(str::to_owned),
        };

        let mut actions = Vec::new();
        self.transition(SessionState::Live, &mut actions);
        actions.push(SessionAction::Send(join));
        actions
    }

    fn handle_failed(&mut self, generation: u64, reason: &str) -> Vec<SessionAction> {
        if !self.is_current(generation, SessionState::Connecting) {
            tracing::debug!(generation, "ignoring stale transport failure");
            return Vec::new();
        }

        tracing::warn!(reason, "relay unreachable, falling back to simulated session");

        let Some(identity) = &self.identity else {
            return Vec::new();
        };
        let simulation = SimulatedSession::new(identity.name(), self.script.clone(), generation);

        let mut actions = Vec::new();
        self.transition(SessionState::Failed, &mut actions);
        self.transition(SessionState::Simulated, &mut actions);

        self.roster = Roster::from_members(simulation.opening_roster());
        actions.push(SessionAction::Deliver(InboundEvent::RosterChanged {
            members: self.roster.members().to_vec(),
        }));
        actions.extend(simulation.schedule());

        self.simulation = Some(simulation);
        actions
    }

    fn handle_closed(&mut self, generation: u64) -> Vec<SessionAction> {
        if !self.is_current(generation, SessionState::Live) {
            return Vec::new();
        }

        tracing::info!("relay connection closed");
        let mut actions = Vec::new();
        self.teardown(&mut actions);
        actions
    }

    fn handle_frame(&mut self, generation: u64, frame: &str) -> Vec<SessionAction> {
        if !self.is_current(generation, SessionState::Live) {
            tracing::debug!(generation, "ignoring frame outside live session");
            return Vec::new();
        }

        let Some(event) = relaychat_proto::decode(frame) else {
            tracing::debug!(len = frame.len(), "dropping malformed frame");
            return Vec::new();
        };

        match event {
            InboundEvent::MessagePosted { .. } => vec![SessionAction::Deliver(event)],
            InboundEvent::RosterChanged { members } => {
                self.roster = Roster::from_members(members);
                tracing::debug!(members = self.roster.len(), "roster updated");
                vec![SessionAction::Deliver(InboundEvent::RosterChanged {
                    members: self.roster.members().to_vec(),
                })]
            },
            InboundEvent::Rejected { reason } => {
                tracing::warn!(%reason, "relay rejected session");
                let mut actions = vec![SessionAction::Deliver(InboundEvent::Rejected { reason })];
                self.transition(SessionState::Failed, &mut actions);
                actions.push(SessionAction::CloseTransport);
                self.teardown(&mut actions);
                actions
            },
        }
    }

    fn handle_due(&mut self, generation: u64, index: usize) -> Vec<SessionAction> {
        if !self.is_current(generation, SessionState::Simulated) {
            return Vec::new();
        }

        self.simulation
            .as_mut()
            .and_then(|simulation| simulation.fire(generation, index))
            .map(SessionAction::Deliver)
            .into_iter()
            .collect()
    }

    /// Forget the session and return to `Disconnected`.
    fn teardown(&mut self, actions: &mut Vec<SessionAction>) {
        self.generation = self.generation.wrapping_add(1);
        self.identity = None;
        self.simulation = None;
        self.roster.clear();
        self.transition(SessionState::Disconnected, actions);
    }

    fn transition(&mut self, to: SessionState, actions: &mut Vec<SessionAction>) {
        let from = self.state;
        if from == to {
            return;
        }
        tracing::debug!(%from, %to, "session state changed");
        self.state = to;
        actions.push(SessionAction::StateChanged { from, to });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> SessionController {
        SessionController::new(&ClientConfig::new())
    }

    fn connecting(name: &str) -> SessionController {
        let mut session = controller();
        session.join(name, None).unwrap();
        session
    }

    fn live(name: &str) -> SessionController {
        let mut session = connecting(name);
        let generation = session.generation();
        session.handle(SessionEvent::TransportOpened { generation });
        session
    }

    fn simulated(name: &str) -> SessionController {
        let mut session = connecting(name);
        let generation = session.generation();
        session.handle(SessionEvent::TransportFailed { generation, reason: "refused".into() });
        session
    }

    fn sends(actions: &[SessionAction]) -> Vec<&OutboundIntent> {
        actions
            .iter()
            .filter_map(|a| match a {
                SessionAction::Send(intent) => Some(intent),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn join_moves_to_connecting() {
        let mut session = controller();
        let actions = session.join("Al", None).unwrap();

        assert_eq!(session.state(), SessionState::Connecting);
        assert!(matches!(actions.as_slice(), [
            SessionAction::StateChanged {
                from: SessionState::Disconnected,
                to: SessionState::Connecting
            },
            SessionAction::Connect { .. }
        ]));
    }

    #[test]
    fn join_twice_is_rejected() {
        let mut session = connecting("Al");
        let err = session.join("Bo", None).unwrap_err();

        assert_eq!(err, SessionError::AlreadyJoined { state: SessionState::Connecting });
        assert_eq!(session.identity().map(Identity::name), Some("Al"));
    }

    #[test]
    fn opened_sends_join_first() {
        let mut session = controller();
        session.join("Al", Some("pw")).unwrap();
        let generation = session.generation();

        let actions = session.handle(SessionEvent::TransportOpened { generation });

        assert_eq!(session.state(), SessionState::Live);
        assert_eq!(sends(&actions), [&OutboundIntent::Join {
            name: "Al".into(),
            password: Some("pw".into())
        }]);
    }

    #[test]
    fn stale_open_is_closed() {
        let mut session = connecting("Al");
        let stale = session.generation();
        session.leave();

        let actions = session.handle(SessionEvent::TransportOpened { generation: stale });

        assert_eq!(session.state(), SessionState::Disconnected);
        assert_eq!(actions, vec![SessionAction::CloseTransport]);
    }

    #[test]
    fn failure_falls_back_to_simulation() {
        let session = simulated("Bo");

        assert_eq!(session.state(), SessionState::Simulated);
        assert_eq!(session.roster().members(), ["Bo", "Ada", "Grace"]);
        assert_eq!(session.pending_scripted(), 2);
    }

    #[test]
    fn failure_announces_failed_then_simulated() {
        let mut session = connecting("Bo");
        let generation = session.generation();

        let actions =
            session.handle(SessionEvent::TransportFailed { generation, reason: "refused".into() });

        let transitions: Vec<_> = actions
            .iter()
            .filter_map(|a| match a {
                SessionAction::StateChanged { to, .. } => Some(*to),
                _ => None,
            })
            .collect();
        assert_eq!(transitions, [SessionState::Failed, SessionState::Simulated]);

        let scheduled = actions.iter().filter(|a| matches!(a, SessionAction::Schedule { .. }));
        assert_eq!(scheduled.count(), 2);
    }

    #[test]
    fn live_send_posts_trimmed_content() {
        let mut session = live("Al");
        let actions = session.send_message("  hi there \n");

        assert_eq!(actions, vec![SessionAction::Send(OutboundIntent::Post {
            name: "Al".into(),
            content: "hi there".into()
        })]);
    }

    #[test]
    fn blank_messages_are_ignored() {
        let mut session = live("Al");
        assert!(session.send_message("   ").is_empty());
        assert!(session.send_message("").is_empty());
    }

    #[test]
    fn send_outside_session_is_ignored() {
        let mut session = controller();
        assert!(session.send_message("hi").is_empty());

        let mut session = connecting("Al");
        assert!(session.send_message("hi").is_empty());
    }

    #[test]
    fn simulated_send_echoes_locally() {
        let mut session = simulated("Bo");
        let actions = session.send_message("hello");

        assert_eq!(actions, vec![SessionAction::Deliver(InboundEvent::MessagePosted {
            author: "Bo".into(),
            content: "hello".into()
        })]);
    }

    #[test]
    fn leave_live_sends_leave_then_closes() {
        let mut session = live("Al");
        let actions = session.leave();

        assert!(matches!(actions.as_slice(), [
            SessionAction::Send(OutboundIntent::Leave { .. }),
            SessionAction::CloseTransport,
            SessionAction::StateChanged { to: SessionState::Disconnected, .. }
        ]));
        assert!(session.identity().is_none());
    }

    #[test]
    fn leave_is_idempotent() {
        let mut session = live("Al");
        session.leave();

        assert!(session.leave().is_empty());
        assert_eq!(session.state(), SessionState::Disconnected);
    }

    #[test]
    fn leave_cancels_scripted_deliveries() {
        let mut session = simulated("Bo");
        let generation = session.generation();

        let actions = session.leave();
        assert!(actions.contains(&SessionAction::CancelScheduled));

        let late = session.handle(SessionEvent::ScriptDue { generation, index: 0 });
        assert!(late.is_empty());
    }

    #[test]
    fn rejection_surfaces_reason_and_disconnects() {
        let mut session = live("Al");
        let generation = session.generation();

        let actions = session.handle(SessionEvent::FrameReceived {
            generation,
            frame: r#"{"type":"error","error":"duplicate name"}"#.into(),
        });

        assert_eq!(
            actions.first(),
            Some(&SessionAction::Deliver(InboundEvent::Rejected {
                reason: "duplicate name".into()
            }))
        );
        assert!(actions.contains(&SessionAction::CloseTransport));
        assert_eq!(session.state(), SessionState::Disconnected);
        assert!(session.identity().is_none());
    }

    #[test]
    fn remote_close_disconnects() {
        let mut session = live("Al");
        let generation = session.generation();

        let actions = session.handle(SessionEvent::TransportClosed { generation });

        assert!(matches!(actions.as_slice(), [SessionAction::StateChanged {
            from: SessionState::Live,
            to: SessionState::Disconnected
        }]));
        assert!(session.identity().is_none());
    }

    #[test]
    fn roster_update_is_deduplicated() {
        let mut session = live("Al");
        let generation = session.generation();

        let actions = session.handle(SessionEvent::FrameReceived {
            generation,
            frame: r#"{"type":"userList","users":["Al","Bo","Al"]}"#.into(),
        });

        assert_eq!(actions, vec![SessionAction::Deliver(InboundEvent::RosterChanged {
            members: vec!["Al".into(), "Bo".into()]
        })]);
        assert!(session.roster().contains("Al"));
        assert_eq!(session.roster().len(), 2);
    }

    #[test]
    fn malformed_frames_are_dropped() {
        let mut session = live("Al");
        let generation = session.generation();

        for frame in ["", "{", r#"{"type":"message"}"#, r#"{"type":"typing"}"#] {
            let actions =
                session.handle(SessionEvent::FrameReceived { generation, frame: frame.into() });
            assert!(actions.is_empty(), "frame {frame:?} produced {actions:?}");
        }
        assert_eq!(session.state(), SessionState::Live);
    }
}
