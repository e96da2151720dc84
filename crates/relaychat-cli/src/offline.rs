//! Driver used with `--offline`: every connection attempt is refused, so
//! joins go straight to the local demo session.

use relaychat_app::Driver;

/// Error returned by [`OfflineDriver`].
#[derive(Debug, thiserror::Error)]
#[error("offline mode")]
pub struct Offline;

/// A [`Driver`] with no network.
#[derive(Debug, Default)]
pub struct OfflineDriver;

impl Driver for OfflineDriver {
    type Error = Offline;

    async fn connect(&mut self, _url: &str) -> Result<(), Offline> {
        Err(Offline)
    }

    async fn send_text(&mut self, _frame: String) -> Result<(), Offline> {
        Err(Offline)
    }

    async fn recv_text(&mut self) -> Option<String> {
        None
    }

    fn is_connected(&self) -> bool {
        false
    }

    fn close(&mut self) {}
}
