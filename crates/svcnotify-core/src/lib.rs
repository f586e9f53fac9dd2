//! # svcnotify-core
//!
//! Lifecycle notifications to the init/service manager.
//!
//! A supervised process reports its state (`READY=1`, `STOPPING=1`,
//! `STATUS=...`, `WATCHDOG=1`) by sending a datagram to the socket named by
//! `NOTIFY_SOCKET`. This crate exposes that as a single operation taking a
//! JSON request buffer:
//!
//! ```json
//! { "state": "READY=1" }
//! ```
//!
//! The pipeline is linear: decode the request, validate the `state` field,
//! read the current process id, send. Nothing is retried or queued, and
//! nothing is retained between calls.
//!
//! ## Example
//!
//! ```rust
//! use svcnotify_core::{Notifier, NotifyError, NotifyRequestHandler, NotifyStatus};
//!
//! struct Unconfigured;
//!
//! impl Notifier for Unconfigured {
//!     fn pid_notify(&self, _pid: u32, _state: &str) -> NotifyStatus {
//!         NotifyStatus::NOT_CONFIGURED
//!     }
//! }
//!
//! let handler = NotifyRequestHandler::new(Unconfigured);
//! let err = handler.notify(br#"{"state": "READY=1"}"#).unwrap_err();
//! assert!(matches!(err, NotifyError::NotificationDelivery { code: 0, .. }));
//! ```
//!
//! ## Modules
//!
//! - [`request`]: request decoding and validation
//! - [`handler`]: the [`NotifyRequestHandler`]
//! - [`notifier`]: the [`Notifier`] seam and [`NotifyStatus`]
//! - [`config`]: `NOTIFY_SOCKET` resolution
//! - `socket`: the Linux datagram sender, [`SocketNotifier`]
//! - [`error`]: [`NotifyError`]

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod error;
pub mod handler;
pub mod notifier;
pub mod request;
#[cfg(target_os = "linux")]
mod socket;

pub use config::{NOTIFY_SOCKET_ENV, NotifierConfig, NotifySocket, SocketAddrError};
pub use error::NotifyError;
pub use handler::{LOG_TARGET, NotifyRequestHandler};
pub use notifier::{Notifier, NotifyStatus};
pub use request::NotificationRequest;
#[cfg(target_os = "linux")]
pub use socket::SocketNotifier;

/// Notifies the service manager named by `NOTIFY_SOCKET`.
///
/// The environment is read on every call.
///
/// # Errors
///
/// See [`NotifyRequestHandler::notify`]. An unset `NOTIFY_SOCKET` yields
/// [`NotifyError::NotificationDelivery`] with code `0`.
#[cfg(target_os = "linux")]
pub fn notify(request: &[u8]) -> Result<(), NotifyError> {
    NotifyRequestHandler::new(SocketNotifier::from_env()).notify(request)
}
