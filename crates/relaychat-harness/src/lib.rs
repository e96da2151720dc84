//! Deterministic simulation harness for relaychat.
//!
//! In-memory implementations of the runtime's seams, for tests that run the
//! real [`relaychat_app::Runtime`] under tokio's paused clock:
//!
//! - [`SimDriver`]: scriptable relay (reachable, refusing or hanging)
//! - [`RecordingObserver`]: timestamped log of every observer callback
//!
//! # Invariant Testing
//!
//! The `invariants` module checks behavioral properties against snapshots of
//! a controller or an observer trace. Use [`InvariantRegistry::standard()`]
//! for every built-in check.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod invariants;
pub mod recording;
pub mod sim_driver;

pub use invariants::{
    ConnectionFlipsAlternate, ControllerView, FailedIsTransient, IdentityMatchesState, Invariant,
    InvariantKind, InvariantRegistry, InvariantResult, SelfInSimulatedRoster, SessionSnapshot,
    TransitionsChain, Violation,
};
pub use recording::{Observed, Recorded, RecordingObserver};
pub use sim_driver::{NAME_TAKEN, RelayMode, SimDriver, SimDriverError};
