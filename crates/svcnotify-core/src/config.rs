//! Notification socket configuration.
//!
//! The service manager advertises its notification channel through the
//! `NOTIFY_SOCKET` environment variable. The value is either an absolute
//! filesystem path or, on Linux, an abstract-namespace name written with a
//! leading `@`.

use std::ffi::{OsStr, OsString};
use std::os::unix::ffi::OsStrExt;
use std::path::PathBuf;

use thiserror::Error;

/// Environment variable naming the notification socket.
pub const NOTIFY_SOCKET_ENV: &str = "NOTIFY_SOCKET";

/// Capacity of `sockaddr_un.sun_path` on Linux.
pub const SUN_PATH_CAPACITY: usize = 108;

/// Reasons a `NOTIFY_SOCKET` value cannot be used.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SocketAddrError {
    /// The value is empty, or is a bare `@`.
    #[error("notification socket address is empty")]
    Empty,

    /// The value is neither absolute nor abstract.
    #[error("notification socket path must be absolute or start with '@': {0}")]
    Relative(String),

    /// The address does not fit in `sun_path`.
    #[error("notification socket address is {len} bytes, limit is {limit}")]
    TooLong {
        /// Length of the offending address.
        len: usize,
        /// Largest accepted length.
        limit: usize,
    },
}

/// A resolved notification socket address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifySocket {
    /// A socket bound at a filesystem path.
    Path(PathBuf),
    /// A Linux abstract-namespace socket; the name excludes the leading NUL.
    Abstract(Vec<u8>),
}

impl NotifySocket {
    /// Parses a `NOTIFY_SOCKET` value.
    ///
    /// # Errors
    ///
    /// Returns a [`SocketAddrError`] if the value is empty, relative, or too
    /// long for a Unix socket address.
    pub fn parse(value: impl AsRef<OsStr>) -> Result<Self, SocketAddrError> {
        let bytes = value.as_ref().as_bytes();
        match bytes {
            [] | [b'@'] => Err(SocketAddrError::Empty),
            [b'@', name @ ..] => {
                // One byte of sun_path is taken by the leading NUL.
                let limit = SUN_PATH_CAPACITY - 1;
                if name.len() > limit {
                    return Err(SocketAddrError::TooLong {
                        len: name.len(),
                        limit,
                    });
                }
                Ok(Self::Abstract(name.to_vec()))
            },
            [b'/', ..] => {
                // Filesystem paths need room for the trailing NUL.
                let limit = SUN_PATH_CAPACITY - 1;
                if bytes.len() > limit {
                    return Err(SocketAddrError::TooLong {
                        len: bytes.len(),
                        limit,
                    });
                }
                Ok(Self::Path(PathBuf::from(value.as_ref())))
            },
            _ => Err(SocketAddrError::Relative(
                value.as_ref().to_string_lossy().into_owned(),
            )),
        }
    }
}

/// Where notifications are sent.
///
/// Holds the raw setting; it is parsed on every send so that an invalid value
/// surfaces as a per-call status rather than a construction failure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotifierConfig {
    socket: Option<OsString>,
}

impl NotifierConfig {
    /// Reads `NOTIFY_SOCKET` from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_value(std::env::var_os(NOTIFY_SOCKET_ENV))
    }

    /// Builds a config from an optional raw value. Empty counts as unset.
    #[must_use]
    pub fn from_value(value: Option<OsString>) -> Self {
        Self {
            socket: value.filter(|v| !v.is_empty()),
        }
    }

    /// Builds a config pointing at an explicit socket.
    #[must_use]
    pub fn with_socket(socket: impl Into<OsString>) -> Self {
        Self::from_value(Some(socket.into()))
    }

    /// Returns `true` if a socket value is present, valid or not.
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.socket.is_some()
    }

    /// Resolves the configured socket.
    ///
    /// `Ok(None)` means no socket is configured.
    ///
    /// # Errors
    ///
    /// Returns a [`SocketAddrError`] if the configured value is unusable.
    pub fn resolve(&self) -> Result<Option<NotifySocket>, SocketAddrError> {
        self.socket.as_deref().map(NotifySocket::parse).transpose()
    }
}
