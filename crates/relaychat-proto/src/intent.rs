//! Client-to-relay intents.

/// Something the client asks the relay to do.
///
/// Constructed by the session layer and consumed immediately by
/// [`crate::encode`]. Every variant carries the sender's display name because
/// the relay is connectionless with respect to identity: it trusts the
/// `username` field of each frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundIntent {
    /// Announce ourselves to the relay.
    Join {
        /// Display name.
        name: String,
        /// Optional room password. `None` omits the field on the wire.
        password: Option<String>,
    },

    /// Tell the relay we are going away.
    Leave {
        /// Display name.
        name: String,
    },

    /// Post a chat message.
    Post {
        /// Display name of the author.
        name: String,
        /// Message text, already trimmed by the caller.
        content: String,
    },
}

impl OutboundIntent {
    /// Wire `type` tag for this intent.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Join { .. } => "join",
            Self::Leave { .. } => "leave",
            Self::Post { .. } => "message",
        }
    }

    /// Display name carried by this intent.
    pub fn name(&self) -> &str {
        match self {
            Self::Join { name, .. } | Self::Leave { name } | Self::Post { name, .. } => name,
        }
    }
}
