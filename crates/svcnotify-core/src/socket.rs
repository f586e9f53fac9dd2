//! Datagram delivery to the service manager's notification socket.
//!
//! Mirrors `sd_pid_notify(3)`: one unbound `AF_UNIX` datagram per call, with
//! `SCM_CREDENTIALS` attached when the message is attributed to a process
//! other than the sender. If the kernel refuses those credentials the send is
//! retried once without them, so the message still arrives under the sender's
//! own identity.

use std::io::IoSlice;
use std::os::fd::AsRawFd;

use nix::errno::Errno;
use nix::libc;
use nix::sys::socket::{
    AddressFamily, ControlMessage, MsgFlags, SockFlag, SockType, UnixAddr, UnixCredentials,
    sendmsg, socket,
};
use nix::unistd::{getgid, getuid};
use tracing::{debug, warn};

use crate::config::{NotifierConfig, NotifySocket};
use crate::handler::LOG_TARGET;
use crate::notifier::{Notifier, NotifyStatus};

/// Sends notifications over the socket named by a [`NotifierConfig`].
#[derive(Debug, Clone, Default)]
pub struct SocketNotifier {
    config: NotifierConfig,
}

impl SocketNotifier {
    /// Creates a notifier for the given configuration.
    #[must_use]
    pub const fn new(config: NotifierConfig) -> Self {
        Self { config }
    }

    /// Creates a notifier for the socket named by `NOTIFY_SOCKET`.
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(NotifierConfig::from_env())
    }
}

impl Notifier for SocketNotifier {
    fn pid_notify(&self, pid: u32, state: &str) -> NotifyStatus {
        // The service manager discards datagrams carrying NUL bytes.
        if state.is_empty() || state.contains('\0') {
            return NotifyStatus::from_errno(Errno::EINVAL as i32);
        }

        let target = match self.config.resolve() {
            Ok(Some(target)) => target,
            Ok(None) => return NotifyStatus::NOT_CONFIGURED,
            Err(e) => {
                debug!(target: LOG_TARGET, error = %e, "unusable notification socket");
                return NotifyStatus::from_errno(Errno::EINVAL as i32);
            },
        };

        match send_datagram(&target, pid, state.as_bytes()) {
            Ok(()) => NotifyStatus::ACCEPTED,
            Err(errno) => NotifyStatus::from_errno(errno as i32),
        }
    }
}

fn unix_addr(target: &NotifySocket) -> nix::Result<UnixAddr> {
    match target {
        NotifySocket::Path(path) => UnixAddr::new(path.as_path()),
        NotifySocket::Abstract(name) => UnixAddr::new_abstract(name),
    }
}

/// Credentials to attach when `pid` names a process other than ourselves.
fn foreign_credentials(pid: u32) -> nix::Result<Option<UnixCredentials>> {
    if pid == 0 || pid == std::process::id() {
        return Ok(None);
    }
    let pid = libc::pid_t::try_from(pid).map_err(|_| Errno::EINVAL)?;
    Ok(Some(UnixCredentials::from(libc::ucred {
        pid,
        uid: getuid().as_raw(),
        gid: getgid().as_raw(),
    })))
}

fn send_datagram(target: &NotifySocket, pid: u32, payload: &[u8]) -> nix::Result<()> {
    let addr = unix_addr(target)?;
    let credentials = foreign_credentials(pid)?;
    let fd = socket(
        AddressFamily::Unix,
        SockType::Datagram,
        SockFlag::SOCK_CLOEXEC,
        None,
    )?;
    let iov = [IoSlice::new(payload)];

    if let Some(credentials) = credentials {
        let cmsgs = [ControlMessage::ScmCredentials(&credentials)];
        match sendmsg(
            fd.as_raw_fd(),
            &iov,
            &cmsgs,
            MsgFlags::MSG_NOSIGNAL,
            Some(&addr),
        ) {
            Ok(_) => return Ok(()),
            Err(errno) => {
                warn!(
                    target: LOG_TARGET,
                    pid,
                    error = %errno,
                    "service manager refused attributed credentials, resending as self"
                );
            },
        }
    }

    sendmsg(fd.as_raw_fd(), &iov, &[], MsgFlags::MSG_NOSIGNAL, Some(&addr))?;
    Ok(())
}
