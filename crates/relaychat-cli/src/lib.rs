//! Terminal client for relaychat.
//!
//! A thin shell over [`relaychat_app::Runtime`]: stdin lines become
//! [`relaychat_app::SessionHandle`] calls and session events are printed one
//! per line. All session logic lives in `relaychat-core`.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod console;
pub mod error;
pub mod input;
pub mod offline;
pub mod shell;

pub use console::ConsoleObserver;
pub use error::CliError;
pub use input::UserInput;
pub use offline::OfflineDriver;
