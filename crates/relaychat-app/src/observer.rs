//! Presentation callbacks.
//!
//! The [`SessionObserver`] is the only way the runtime talks to the UI. One
//! observer per runtime; richer fan-out belongs in the observer itself.

use relaychat_core::{InboundEvent, SessionState};

/// Receives session events and state changes.
///
/// Callbacks run on the runtime task, in the order the relay or simulator
/// produced them. They should return quickly.
pub trait SessionObserver: Send {
    /// A chat message was posted.
    fn on_message(&mut self, author: &str, content: &str);

    /// The member list was replaced.
    fn on_roster_changed(&mut self, members: &[String]);

    /// The relay refused the session. `reason` is passed through verbatim.
    fn on_rejected(&mut self, reason: &str);

    /// The relay connection opened (`true`) or went away (`false`).
    fn on_connection_state_changed(&mut self, is_live: bool);

    /// Any session state transition, including simulated mode.
    fn on_state_changed(&mut self, from: SessionState, to: SessionState) {
        let _ = (from, to);
    }

    /// Route an inbound event to the matching callback.
    fn on_event(&mut self, event: &InboundEvent) {
        match event {
            InboundEvent::MessagePosted { author, content } => self.on_message(author, content),
            InboundEvent::RosterChanged { members } => self.on_roster_changed(members),
            InboundEvent::Rejected { reason } => self.on_rejected(reason),
        }
    }
}
