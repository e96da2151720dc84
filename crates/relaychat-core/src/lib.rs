//! Core session logic for relaychat.
//!
//! Sans-IO state machines for the client side of the relay protocol. The
//! [`SessionController`] receives inputs (joins, leaves, transport outcomes,
//! frames, timer firings) and returns [`SessionAction`]s for a runtime to
//! execute. Nothing in this crate performs I/O or reads a clock, so every
//! transition is testable without a network.
//!
//! # Components
//!
//! - [`SessionController`]: connection lifecycle and message routing
//! - [`SimulatedSession`]: scripted relay stand-in used when the relay is
//!   unreachable
//! - [`Identity`] / [`Roster`]: session data model
//! - [`ClientConfig`]: endpoint, timeouts and demo content

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod config;
pub mod error;
pub mod identity;
pub mod roster;
pub mod session;
pub mod simulated;

pub use config::{ClientConfig, Endpoint, ScriptedMessage, SimulationScript};
pub use error::{ScriptError, SessionError, ValidationError};
pub use identity::{Identity, MAX_NAME_LEN, MIN_NAME_LEN};
pub use relaychat_proto::{InboundEvent, OutboundIntent};
pub use roster::Roster;
pub use session::{SessionAction, SessionController, SessionEvent, SessionState};
pub use simulated::SimulatedSession;
