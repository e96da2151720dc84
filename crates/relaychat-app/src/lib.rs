//! Async runtime for relaychat clients.
//!
//! Hosts the [`relaychat_core::SessionController`] on a single tokio task and
//! executes its actions against a [`Driver`], reporting to a
//! [`SessionObserver`]. Presentation layers hold a [`SessionHandle`].
//!
//! # Components
//!
//! - [`Runtime`]: event loop multiplexing commands, frames and timers
//! - [`Driver`]: transport abstraction
//! - [`SessionObserver`]: presentation callbacks
//! - [`SessionHandle`]: non-blocking triggers
//!
//! # Features
//!
//! - `transport`: WebSocket [`Driver`] built on `tokio-tungstenite`

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod driver;
mod handle;
mod observer;
mod runtime;
#[cfg(feature = "transport")]
pub mod transport;

pub use driver::Driver;
pub use handle::{HandleError, SessionHandle};
pub use observer::SessionObserver;
pub use runtime::Runtime;
#[cfg(feature = "transport")]
pub use transport::{TransportError, WsDriver};
