//! Relay protocol
//!
//! Typed client intents, typed relay events, and the JSON text frames that
//! carry them over the wire.
//!
//! # Wire Format
//!
//! Every frame is a single newline-free UTF-8 JSON object with a `type` tag:
//!
//! ```text
//! client -> relay   {"type":"join","username":"Al","password":"pw"}
//!                   {"type":"leave","username":"Al"}
//!                   {"type":"message","username":"Al","content":"hi"}
//!
//! relay -> client   {"type":"message","username":"Bo","content":"hey"}
//!                   {"type":"userList","users":["Al","Bo"]}
//!                   {"type":"error","error":"duplicate name"}
//! ```
//!
//! # Components
//!
//! - [`OutboundIntent`]: what the client asks the relay to do
//! - [`InboundEvent`]: what the relay tells the client
//! - [`encode`] / [`decode`]: pure translation to and from text frames

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod codec;
pub mod errors;
mod event;
mod intent;

pub use codec::{decode, encode};
pub use errors::{ProtocolError, Result};
pub use event::InboundEvent;
pub use intent::OutboundIntent;
