//! Protocol error types.
//!
//! Only encoding can fail. Decoding is total: frames that do not match a
//! known shape are dropped by [`crate::decode`] instead of producing an error,
//! so there is deliberately no decode variant here.

use thiserror::Error;

/// Result alias for protocol operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors produced while building wire frames.
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// JSON serialization of an outbound frame failed.
    #[error("failed to encode {kind} frame: {source}")]
    Encode {
        /// Wire `type` tag of the frame being encoded.
        kind: &'static str,
        /// Underlying serializer error.
        #[source]
        source: serde_json::Error,
    },
}
