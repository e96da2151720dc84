//! Local stand-in for the relay.
//!
//! Activated when no relay is reachable so the rest of the system sees the
//! same event shapes it would see live: an opening roster, then a fixed
//! sequence of scripted messages on a timer.
//!
//! The session never sleeps itself. It hands out
//! [`SessionAction::Schedule`] requests and the runtime feeds
//! [`crate::SessionEvent::ScriptDue`] back when each delay elapses.
//!
//! # Invariants
//!
//! - Each script entry is delivered at most once.
//! - Entries are delivered in script order.
//! - Nothing from an older generation is delivered.

use relaychat_proto::InboundEvent;

use crate::{config::SimulationScript, session::SessionAction};

/// Scripted playback for one simulated session.
#[derive(Debug, Clone)]
pub struct SimulatedSession {
    own_name: String,
    script: SimulationScript,
    generation: u64,
    next: usize,
}

impl SimulatedSession {
    /// Create a session for `own_name`, valid for `generation` only.
    pub fn new(own_name: &str, script: SimulationScript, generation: u64) -> Self {
        Self { own_name: own_name.to_owned(), script, generation, next: 0 }
    }

    /// Roster announced on activation: our own name, then the demo members.
    pub fn opening_roster(&self) -> Vec<String> {
        std::iter::once(self.own_name.clone())
            .chain(self.script.demo_members().iter().cloned())
            .collect()
    }

    /// One schedule request per scripted message, delays measured from now.
    pub fn schedule(&self) -> impl Iterator<Item = SessionAction> + '_ {
        self.script.messages().iter().enumerate().map(|(index, message)| {
            SessionAction::Schedule { generation: self.generation, index, delay: message.delay }
        })
    }

    /// Deliver script entry `index` if it is due.
    ///
    /// Returns `None` for a stale generation, an entry already delivered, or
    /// an entry whose predecessor has not fired yet.
    pub fn fire(&mut self, generation: u64, index: usize) -> Option<InboundEvent> {
        if generation != self.generation || index != self.next {
            return None;
        }

        let message = self.script.messages().get(index)?;
        self.next += 1;
        Some(InboundEvent::MessagePosted {
            author: message.author.clone(),
            content: message.text.clone(),
        })
    }

    /// Echo of our own message. Never delayed, never transmitted.
    pub fn local_post(&self, content: &str) -> InboundEvent {
        InboundEvent::MessagePosted { author: self.own_name.clone(), content: content.to_owned() }
    }

    /// Scripted messages not yet delivered.
    pub fn remaining(&self) -> usize {
        self.script.messages().len().saturating_sub(self.next)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::ScriptedMessage;

    fn script() -> SimulationScript {
        SimulationScript::new(vec!["Ada".into(), "Grace".into()], vec![
            ScriptedMessage::new("Ada", "one", Duration::from_millis(100)),
            ScriptedMessage::new("Grace", "two", Duration::from_millis(300)),
        ])
        .unwrap()
    }

    #[test]
    fn roster_leads_with_own_name() {
        let session = SimulatedSession::new("Bo", script(), 1);
        assert_eq!(session.opening_roster(), ["Bo", "Ada", "Grace"]);
    }

    #[test]
    fn schedule_covers_every_entry_in_order() {
        let session = SimulatedSession::new("Bo", script(), 7);
        let scheduled: Vec<_> = session.schedule().collect();

        assert_eq!(scheduled, vec![
            SessionAction::Schedule { generation: 7, index: 0, delay: Duration::from_millis(100) },
            SessionAction::Schedule { generation: 7, index: 1, delay: Duration::from_millis(300) },
        ]);
    }

    #[test]
    fn entries_fire_once_in_order() {
        let mut session = SimulatedSession::new("Bo", script(), 1);

        // Out of order
        assert_eq!(session.fire(1, 1), None);

        assert_eq!(
            session.fire(1, 0),
            Some(InboundEvent::MessagePosted { author: "Ada".into(), content: "one".into() })
        );
        // Duplicate
        assert_eq!(session.fire(1, 0), None);

        assert!(session.fire(1, 1).is_some());
        assert_eq!(session.fire(1, 2), None);
        assert_eq!(session.remaining(), 0);
    }

    #[test]
    fn stale_generation_never_fires() {
        let mut session = SimulatedSession::new("Bo", script(), 2);

        assert_eq!(session.fire(1, 0), None);
        assert_eq!(session.remaining(), 2);
    }

    #[test]
    fn local_post_is_authored_by_us() {
        let session = SimulatedSession::new("Bo", script(), 1);

        assert_eq!(
            session.local_post("hi"),
            InboundEvent::MessagePosted { author: "Bo".into(), content: "hi".into() }
        );
    }
}
