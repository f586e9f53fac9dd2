//! Request handling: decode, validate, send.

use tracing::debug;

use crate::error::NotifyError;
use crate::notifier::Notifier;
use crate::request::NotificationRequest;

/// Tracing target for every event emitted by this crate.
pub const LOG_TARGET: &str = "svcnotify::systemd";

/// Validates notification requests and forwards them to a [`Notifier`].
///
/// The handler holds no mutable state. Calls are independent and may run
/// concurrently from several threads whenever `N: Sync`.
#[derive(Debug, Clone, Default)]
pub struct NotifyRequestHandler<N> {
    notifier: N,
}

impl<N: Notifier> NotifyRequestHandler<N> {
    /// Creates a handler sending through `notifier`.
    #[must_use]
    pub const fn new(notifier: N) -> Self {
        Self { notifier }
    }

    /// Decodes `request` and notifies the service manager of its state.
    ///
    /// The message is attributed to the calling process, whose id is read
    /// on every call.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::MalformedRequest`], [`NotifyError::UnknownField`]
    /// or [`NotifyError::MissingParameter`] for bad input, and
    /// [`NotifyError::NotificationDelivery`] when the notifier reports a
    /// non-positive status.
    pub fn notify(&self, request: &[u8]) -> Result<(), NotifyError> {
        let request = NotificationRequest::from_slice(request)?;
        let state = request.state();
        let pid = std::process::id();

        debug!(target: LOG_TARGET, pid, state, "is due to notify service manager");
        let status = self.notifier.pid_notify(pid, state);
        if !status.is_accepted() {
            return Err(NotifyError::delivery(status.code(), request.into_state()));
        }
        debug!(target: LOG_TARGET, pid, "notification sent successfully");

        Ok(())
    }
}
