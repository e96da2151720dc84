//! Driver trait for abstracting transport I/O.
//!
//! The [`Driver`] trait decouples the runtime from a specific transport. The
//! WebSocket driver talks to a real relay; the simulation driver in the
//! harness crate feeds scripted frames, so the same [`crate::Runtime`]
//! orchestration runs in production and in tests.

use std::future::Future;

/// Abstracts the relay transport for the runtime.
///
/// # Implementations
///
/// - **WebSocket**: `tokio-tungstenite`, behind the `transport` feature
/// - **Simulation**: in-memory relay from `relaychat-harness`
pub trait Driver: Send {
    /// Transport-specific error type.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Open the transport to `url`.
    ///
    /// The runtime bounds this with its connect timeout and drops the future
    /// on expiry.
    ///
    /// # Errors
    ///
    /// Returns an error if the relay cannot be reached.
    fn connect(&mut self, url: &str) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Send one text frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport is closed or the write fails.
    fn send_text(&mut self, frame: String) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Receive the next text frame.
    ///
    /// Returns `None` once the transport has closed. Must be cancel-safe: the
    /// runtime drops this future whenever another wake-up wins.
    fn recv_text(&mut self) -> impl Future<Output = Option<String>> + Send;

    /// Whether the transport is open.
    fn is_connected(&self) -> bool;

    /// Close the transport. Best effort, idempotent.
    fn close(&mut self);
}
