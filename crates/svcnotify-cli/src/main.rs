//! svcnotify - report lifecycle state to the service manager
//!
//! Thin front-end over `svcnotify-core`. The request is taken from the
//! positional state argument, from `--json`, or from stdin, in that order of
//! preference.

use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use svcnotify_core::{NOTIFY_SOCKET_ENV, NotifierConfig, NotifyRequestHandler, SocketNotifier};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// svcnotify - report lifecycle state to the service manager
#[derive(Parser, Debug)]
#[command(name = "svcnotify")]
#[command(version, about, long_about = None)]
struct Cli {
    /// State to send, e.g. READY=1 or STATUS=warming caches
    #[arg(conflicts_with = "json")]
    state: Option<String>,

    /// Raw request object, e.g. '{"state": "READY=1"}'
    #[arg(long)]
    json: Option<String>,

    /// Notification socket path, or @name for an abstract socket
    #[arg(long, env = NOTIFY_SOCKET_ENV)]
    socket: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

impl Cli {
    /// Builds the request buffer, reading `input` only when no request was
    /// given on the command line.
    fn request(&self, mut input: impl Read) -> Result<Vec<u8>> {
        if let Some(state) = &self.state {
            return serde_json::to_vec(&serde_json::json!({ "state": state }))
                .context("failed to encode request");
        }
        if let Some(json) = &self.json {
            return Ok(json.clone().into_bytes());
        }
        let mut buf = Vec::new();
        input
            .read_to_end(&mut buf)
            .context("failed to read request from stdin")?;
        Ok(buf)
    }

    fn notifier_config(&self) -> NotifierConfig {
        NotifierConfig::from_value(self.socket.clone().map(PathBuf::into_os_string))
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(false),
        )
        .init();

    let request = cli.request(io::stdin().lock())?;
    let handler = NotifyRequestHandler::new(SocketNotifier::new(cli.notifier_config()));
    handler
        .notify(&request)
        .context("service manager notification failed")?;

    Ok(())
}
