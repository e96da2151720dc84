//! Relay-to-client events.

/// Something the relay (or the local simulator standing in for it) reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    /// A chat message was posted.
    MessagePosted {
        /// Display name of the author.
        author: String,
        /// Message text.
        content: String,
    },

    /// The set of present members changed. Carries the full roster, not a
    /// diff.
    RosterChanged {
        /// Member display names in relay order.
        members: Vec<String>,
    },

    /// The relay refused us (duplicate name, bad password, ...).
    Rejected {
        /// Relay-supplied reason, passed through verbatim.
        reason: String,
    },
}
