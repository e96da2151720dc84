//! Translation between typed messages and JSON text frames.
//!
//! Both directions are pure: no I/O, no state. The wire structs are private so
//! callers only ever see [`OutboundIntent`] and [`InboundEvent`].
//!
//! # Invariants
//!
//! - One frame per intent, tagged by kind.
//! - [`decode`] is total. Anything that is not a recognized, complete shape
//!   yields `None`; it never panics and never returns an error.

use serde::{Deserialize, Serialize};

use crate::{
    InboundEvent, OutboundIntent,
    errors::{ProtocolError, Result},
};

/// Outbound wire shapes, borrowed from the intent being encoded.
#[derive(Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
enum OutboundFrame<'a> {
    Join {
        username: &'a str,
        #[serde(skip_serializing_if = "Option::is_none")]
        password: Option<&'a str>,
    },
    Leave {
        username: &'a str,
    },
    Message {
        username: &'a str,
        content: &'a str,
    },
}

/// Inbound wire shapes. Unknown `type` tags and missing fields fail
/// deserialization, which [`decode`] turns into `None`.
#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
enum InboundFrame {
    Message { username: String, content: String },
    UserList { users: Vec<String> },
    Error { error: String },
}

impl<'a> From<&'a OutboundIntent> for OutboundFrame<'a> {
    fn from(intent: &'a OutboundIntent) -> Self {
        match intent {
            OutboundIntent::Join { name, password } => {
                Self::Join { username: name, password: password.as_deref() }
            },
            OutboundIntent::Leave { name } => Self::Leave { username: name },
            OutboundIntent::Post { name, content } => {
                Self::Message { username: name, content }
            },
        }
    }
}

impl From<InboundFrame> for InboundEvent {
    fn from(frame: InboundFrame) -> Self {
        match frame {
            InboundFrame::Message { username, content } => {
                Self::MessagePosted { author: username, content }
            },
            InboundFrame::UserList { users } => Self::RosterChanged { members: users },
            InboundFrame::Error { error } => Self::Rejected { reason: error },
        }
    }
}

/// Encode an intent as a single JSON text frame.
///
/// Content is passed through untouched; length limits are the relay's
/// concern.
pub fn encode(intent: &OutboundIntent) -> Result<String> {
    serde_json::to_string(&OutboundFrame::from(intent))
        .map_err(|source| ProtocolError::Encode { kind: intent.kind(), source })
}

/// Decode a relay text frame.
///
/// Returns `None` for anything that is not valid JSON, lacks a known `type`
/// tag, or is missing the fields its tag requires.
pub fn decode(frame: &str) -> Option<InboundEvent> {
    serde_json::from_str::<InboundFrame>(frame).ok().map(InboundEvent::from)
}
