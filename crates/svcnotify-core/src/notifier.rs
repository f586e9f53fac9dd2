//! The notification primitive seam.
//!
//! [`Notifier`] is the boundary between request handling and the OS. The
//! production implementation is [`crate::SocketNotifier`]; tests substitute
//! their own.

/// Signed status returned by a notification primitive.
///
/// Follows the `sd_pid_notify(3)` contract:
/// - `> 0`: the message was accepted for delivery
/// - `0`: no notification socket is configured
/// - `< 0`: a negated `errno`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NotifyStatus(i32);

impl NotifyStatus {
    /// The message was handed to the notification socket.
    pub const ACCEPTED: Self = Self(1);

    /// No notification socket is configured for this process.
    pub const NOT_CONFIGURED: Self = Self(0);

    /// Wraps a raw status code.
    #[must_use]
    pub const fn from_code(code: i32) -> Self {
        Self(code)
    }

    /// Builds a failure status from a positive `errno` value.
    #[must_use]
    pub const fn from_errno(errno: i32) -> Self {
        Self(-errno.saturating_abs())
    }

    /// The raw signed code.
    #[must_use]
    pub const fn code(self) -> i32 {
        self.0
    }

    /// Returns `true` if the message was accepted for delivery.
    #[must_use]
    pub const fn is_accepted(self) -> bool {
        self.0 > 0
    }
}

/// Sends a lifecycle state string to the service manager.
///
/// Implementations must be callable concurrently from several threads; each
/// call is independent of every other.
pub trait Notifier {
    /// Sends `state` attributed to `pid`.
    ///
    /// Never fails in the `Result` sense: every outcome is expressed in the
    /// returned status.
    fn pid_notify(&self, pid: u32, state: &str) -> NotifyStatus;
}

impl<N: Notifier + ?Sized> Notifier for &N {
    fn pid_notify(&self, pid: u32, state: &str) -> NotifyStatus {
        (**self).pid_notify(pid, state)
    }
}
