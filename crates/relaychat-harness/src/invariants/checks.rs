//! Standard invariant checks.
//!
//! These capture behavioral properties that must always hold, whatever
//! sequence of inputs produced the snapshot.

use relaychat_core::SessionState;

use super::{Invariant, InvariantKind, InvariantResult, SessionSnapshot, Violation};
use crate::Observed;

/// `Failed` is passed through, never rested in.
pub struct FailedIsTransient;

impl Invariant for FailedIsTransient {
    fn kind(&self) -> InvariantKind {
        InvariantKind::FailedIsTransient
    }

    fn check(&self, state: &SessionSnapshot) -> InvariantResult {
        if state.state == SessionState::Failed {
            return Err(Violation::new(self.kind(), "session is resting in failed"));
        }
        Ok(())
    }
}

/// An identity exists exactly while the session is not disconnected, and a
/// disconnected session remembers no members or pending script.
pub struct IdentityMatchesState;

impl Invariant for IdentityMatchesState {
    fn kind(&self) -> InvariantKind {
        InvariantKind::IdentityMatchesState
    }

    fn check(&self, state: &SessionSnapshot) -> InvariantResult {
        let Some(view) = &state.controller else {
            return Ok(());
        };
        let disconnected = state.state == SessionState::Disconnected;

        if view.identity.is_some() == disconnected {
            return Err(Violation::new(
                self.kind(),
                format!("identity {:?} while {}", view.identity, state.state),
            ));
        }
        if disconnected && (!view.roster.is_empty() || view.pending_scripted > 0) {
            return Err(Violation::new(
                self.kind(),
                format!(
                    "disconnected with roster {:?} and {} scripted pending",
                    view.roster, view.pending_scripted
                ),
            ));
        }
        Ok(())
    }
}

/// A simulated session always lists the user among its members.
pub struct SelfInSimulatedRoster;

impl Invariant for SelfInSimulatedRoster {
    fn kind(&self) -> InvariantKind {
        InvariantKind::SelfInSimulatedRoster
    }

    fn check(&self, state: &SessionSnapshot) -> InvariantResult {
        let Some(view) = &state.controller else {
            return Ok(());
        };
        if state.state != SessionState::Simulated {
            return Ok(());
        }

        match &view.identity {
            Some(name) if view.roster.contains(name) => Ok(()),
            other => Err(Violation::new(
                self.kind(),
                format!("{other:?} missing from simulated roster {:?}", view.roster),
            )),
        }
    }
}

/// Reported transitions chain: each starts where the previous ended, from
/// `Disconnected`, and never repeats a state.
pub struct TransitionsChain;

impl Invariant for TransitionsChain {
    fn kind(&self) -> InvariantKind {
        InvariantKind::TransitionsChain
    }

    fn check(&self, state: &SessionSnapshot) -> InvariantResult {
        let mut current = SessionState::Disconnected;
        for event in &state.trace {
            if let Observed::State { from, to } = event {
                if *from != current || from == to {
                    return Err(Violation::new(
                        self.kind(),
                        format!("transition {from} -> {to} while in {current}"),
                    ));
                }
                current = *to;
            }
        }
        Ok(())
    }
}

/// Liveness reports alternate, starting with `true`.
pub struct ConnectionFlipsAlternate;

impl Invariant for ConnectionFlipsAlternate {
    fn kind(&self) -> InvariantKind {
        InvariantKind::ConnectionFlipsAlternate
    }

    fn check(&self, state: &SessionSnapshot) -> InvariantResult {
        let mut live = false;
        for event in &state.trace {
            if let Observed::Connection(reported) = event {
                if *reported == live {
                    return Err(Violation::new(
                        self.kind(),
                        format!("liveness reported {reported} twice in a row"),
                    ));
                }
                live = *reported;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invariants::ControllerView;

    fn snapshot(state: SessionState, identity: Option<&str>, roster: &[&str]) -> SessionSnapshot {
        SessionSnapshot {
            state,
            controller: Some(ControllerView {
                identity: identity.map(str::to_owned),
                roster: roster.iter().map(|s| (*s).to_owned()).collect(),
                pending_scripted: 0,
                generation: 1,
            }),
            trace: Vec::new(),
        }
    }

    #[test]
    fn disconnected_with_identity_is_violation() {
        let state = snapshot(SessionState::Disconnected, Some("Al"), &[]);

        assert!(IdentityMatchesState.check(&state).is_err());
    }

    #[test]
    fn simulated_without_self_is_violation() {
        let state = snapshot(SessionState::Simulated, Some("Bo"), &["Ada", "Grace"]);

        assert!(SelfInSimulatedRoster.check(&state).is_err());
    }

    #[test]
    fn broken_chain_is_violation() {
        let state = SessionSnapshot::from_trace(vec![Observed::State {
            from: SessionState::Connecting,
            to: SessionState::Live,
        }]);

        assert!(TransitionsChain.check(&state).is_err());
    }

    #[test]
    fn repeated_liveness_is_violation() {
        let state = SessionSnapshot::from_trace(vec![
            Observed::Connection(true),
            Observed::Connection(true),
        ]);

        assert!(ConnectionFlipsAlternate.check(&state).is_err());
    }
}
