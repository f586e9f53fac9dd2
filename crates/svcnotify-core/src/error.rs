//! Error types for service manager notifications.
//!
//! Every variant records the call site that raised it, so the rendered
//! message points back at the failing step of the notification pipeline.

use std::panic::Location;

use thiserror::Error;

/// Errors returned by [`crate::NotifyRequestHandler::notify`].
///
/// None of these are retried. A caller either gets `Ok(())`, meaning the
/// service manager accepted the message for delivery, or one of these.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The request buffer could not be decoded as a request object.
    #[error("malformed notification request: {reason} (at {site})")]
    MalformedRequest {
        /// Decoder diagnostic.
        reason: String,
        /// Where the error was raised.
        site: &'static Location<'static>,
    },

    /// The request carries a key other than `state`.
    #[error("unknown data field: [{field}] (at {site})")]
    UnknownField {
        /// The offending key.
        field: String,
        /// Where the error was raised.
        site: &'static Location<'static>,
    },

    /// A required parameter is absent or empty.
    #[error("required parameter '{parameter}' not specified (at {site})")]
    MissingParameter {
        /// Name of the missing parameter.
        parameter: &'static str,
        /// Where the error was raised.
        site: &'static Location<'static>,
    },

    /// The notification primitive returned a non-positive status.
    #[error(
        "error notifying service manager, message: [{state}], error code: [{code}] (at {site})"
    )]
    NotificationDelivery {
        /// Status returned by the primitive (`0` or a negated errno).
        code: i32,
        /// The state string that was being sent.
        state: String,
        /// Where the error was raised.
        site: &'static Location<'static>,
    },
}

impl NotifyError {
    /// Creates a malformed request error at the caller's location.
    #[must_use]
    #[track_caller]
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedRequest {
            reason: reason.into(),
            site: Location::caller(),
        }
    }

    /// Creates an unknown field error at the caller's location.
    #[must_use]
    #[track_caller]
    pub fn unknown_field(field: impl Into<String>) -> Self {
        Self::UnknownField {
            field: field.into(),
            site: Location::caller(),
        }
    }

    /// Creates a missing parameter error at the caller's location.
    #[must_use]
    #[track_caller]
    pub fn missing_parameter(parameter: &'static str) -> Self {
        Self::MissingParameter {
            parameter,
            site: Location::caller(),
        }
    }

    /// Creates a delivery error at the caller's location.
    #[must_use]
    #[track_caller]
    pub fn delivery(code: i32, state: impl Into<String>) -> Self {
        Self::NotificationDelivery {
            code,
            state: state.into(),
            site: Location::caller(),
        }
    }

    /// Returns the call site that raised this error.
    #[must_use]
    pub const fn site(&self) -> &'static Location<'static> {
        match self {
            Self::MalformedRequest { site, .. }
            | Self::UnknownField { site, .. }
            | Self::MissingParameter { site, .. }
            | Self::NotificationDelivery { site, .. } => *site,
        }
    }

    /// Returns `true` if the request itself was rejected, before anything
    /// was sent.
    #[must_use]
    pub const fn is_input_error(&self) -> bool {
        match self {
            Self::MalformedRequest { .. }
            | Self::UnknownField { .. }
            | Self::MissingParameter { .. } => true,
            Self::NotificationDelivery { .. } => false,
        }
    }
}
