//! End-to-end delivery against real notification sockets.

#![cfg(target_os = "linux")]

use std::os::linux::net::SocketAddrExt;
use std::os::unix::net::{SocketAddr, UnixDatagram};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use svcnotify_core::{
    Notifier, NotifierConfig, NotifyError, NotifyRequestHandler, NotifyStatus, SocketNotifier,
};
use tempfile::TempDir;

const ENOENT: i32 = 2;
const EINVAL: i32 = 22;

/// A bound receiver standing in for the service manager.
struct FakeServiceManager {
    _dir: TempDir,
    path: PathBuf,
    socket: UnixDatagram,
}

impl FakeServiceManager {
    fn bind() -> Self {
        let dir = tempfile::tempdir().expect("create socket dir");
        let path = dir.path().join("notify.sock");
        let socket = UnixDatagram::bind(&path).expect("bind notify socket");
        socket
            .set_read_timeout(Some(Duration::from_secs(5)))
            .expect("set read timeout");
        Self {
            _dir: dir,
            path,
            socket,
        }
    }

    fn notifier(&self) -> SocketNotifier {
        SocketNotifier::new(NotifierConfig::with_socket(&self.path))
    }

    fn recv(&self) -> String {
        recv_message(&self.socket)
    }
}

fn recv_message(socket: &UnixDatagram) -> String {
    let mut buf = [0u8; 4096];
    let len = socket.recv(&mut buf).expect("receive notification");
    String::from_utf8(buf[..len].to_vec()).expect("utf-8 notification")
}

fn unique_abstract_name() -> String {
    static COUNTER: AtomicUsize = AtomicUsize::new(0);
    format!(
        "svcnotify-test-{}-{}",
        std::process::id(),
        COUNTER.fetch_add(1, Ordering::Relaxed)
    )
}

#[test]
fn delivers_state_to_filesystem_socket() {
    let manager = FakeServiceManager::bind();
    let status = manager
        .notifier()
        .pid_notify(std::process::id(), "READY=1");

    assert_eq!(status, NotifyStatus::ACCEPTED);
    assert_eq!(manager.recv(), "READY=1");
}

#[test]
fn delivers_state_to_abstract_socket() {
    let name = unique_abstract_name();
    let addr = SocketAddr::from_abstract_name(name.as_bytes()).expect("abstract addr");
    let receiver = UnixDatagram::bind_addr(&addr).expect("bind abstract socket");
    receiver
        .set_read_timeout(Some(Duration::from_secs(5)))
        .expect("set read timeout");

    let notifier = SocketNotifier::new(NotifierConfig::with_socket(format!("@{name}")));
    let status = notifier.pid_notify(std::process::id(), "STATUS=warming caches");

    assert_eq!(status, NotifyStatus::ACCEPTED);
    assert_eq!(recv_message(&receiver), "STATUS=warming caches");
}

#[test]
fn foreign_pid_still_delivers() {
    // Unprivileged senders cannot claim pid 1; the notifier falls back to
    // sending under its own credentials.
    let manager = FakeServiceManager::bind();
    let status = manager.notifier().pid_notify(1, "WATCHDOG=1");

    assert_eq!(status, NotifyStatus::ACCEPTED);
    assert_eq!(manager.recv(), "WATCHDOG=1");
}

#[test]
fn missing_listener_reports_negative_errno() {
    let dir = tempfile::tempdir().expect("create socket dir");
    let notifier = SocketNotifier::new(NotifierConfig::with_socket(
        dir.path().join("nobody-listens.sock"),
    ));

    let status = notifier.pid_notify(std::process::id(), "READY=1");
    assert_eq!(status.code(), -ENOENT);
}

#[test]
fn relative_socket_reports_einval() {
    let notifier = SocketNotifier::new(NotifierConfig::with_socket(Path::new("notify.sock")));
    assert_eq!(
        notifier.pid_notify(std::process::id(), "READY=1").code(),
        -EINVAL
    );
}

#[test]
fn handler_round_trip_through_socket() {
    let manager = FakeServiceManager::bind();
    let handler = NotifyRequestHandler::new(manager.notifier());

    handler
        .notify(br#"{"state": "READY=1\nSTATUS=serving"}"#)
        .expect("notify succeeds");
    assert_eq!(manager.recv(), "READY=1\nSTATUS=serving");

    handler
        .notify(br#"{"state": "STOPPING=1"}"#)
        .expect("notify succeeds");
    assert_eq!(manager.recv(), "STOPPING=1");
}

#[test]
fn handler_without_socket_fails_with_zero_code() {
    let handler = NotifyRequestHandler::new(SocketNotifier::new(NotifierConfig::default()));

    let err = handler.notify(br#"{"state": "READY=1"}"#).unwrap_err();
    match err {
        NotifyError::NotificationDelivery { code, ref state, .. } => {
            assert_eq!(code, 0);
            assert_eq!(state, "READY=1");
        },
        other => panic!("expected NotificationDelivery, got {other}"),
    }
}

#[test]
fn handler_rejects_bad_input_before_sending() {
    let manager = FakeServiceManager::bind();
    manager
        .socket
        .set_nonblocking(true)
        .expect("set nonblocking");
    let handler = NotifyRequestHandler::new(manager.notifier());

    let err = handler
        .notify(br#"{"state": "READY=1", "unset_environment": true}"#)
        .unwrap_err();
    assert!(
        matches!(err, NotifyError::UnknownField { ref field, .. } if field == "unset_environment"),
        "{err}"
    );

    let mut buf = [0u8; 64];
    let pending = manager.socket.recv(&mut buf);
    assert!(pending.is_err(), "no datagram expected, got {pending:?}");
}

#[test]
fn handler_refuses_state_with_embedded_nul() {
    let manager = FakeServiceManager::bind();
    manager
        .socket
        .set_nonblocking(true)
        .expect("set nonblocking");
    let handler = NotifyRequestHandler::new(manager.notifier());

    let err = handler
        .notify(br#"{"state": "READY=1\u0000X"}"#)
        .unwrap_err();
    match err {
        NotifyError::NotificationDelivery { code, ref state, .. } => {
            assert_eq!(code, -EINVAL);
            assert_eq!(state, "READY=1\0X");
        },
        other => panic!("expected NotificationDelivery, got {other}"),
    }

    let mut buf = [0u8; 64];
    let pending = manager.socket.recv(&mut buf);
    assert!(pending.is_err(), "no datagram expected, got {pending:?}");
}
