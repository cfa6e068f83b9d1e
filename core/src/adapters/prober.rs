//! TCP connect prober.

use std::future::Future;
use std::io;
use std::time::Duration;

use tokio::net::TcpStream;
use tracing::{trace, warn};

use crate::domain::ProbeOutcome;
use crate::ports::ProberPort;

/// Default host probed for listeners.
pub const DEFAULT_PROBE_HOST: &str = "127.0.0.1";

/// Default per-probe connect timeout.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_millis(1000);

/// Probe `host:port` with a bounded connect attempt.
///
/// `Open` if the connection is established within `timeout`, `Closed`
/// otherwise. The socket is dropped on every path: immediately after a
/// successful connect, or together with the connect future on timeout.
pub async fn probe(host: &str, port: u16, timeout: Duration) -> ProbeOutcome {
    bounded_connect(host, port, timeout, TcpStream::connect((host, port))).await
}

/// Classify a connect attempt bounded by `timeout`.
async fn bounded_connect<S, F>(host: &str, port: u16, timeout: Duration, connect: F) -> ProbeOutcome
where
    F: Future<Output = io::Result<S>>,
{
    match tokio::time::timeout(timeout, connect).await {
        Ok(Ok(stream)) => {
            drop(stream);
            trace!(host, port, "probe open");
            ProbeOutcome::Open
        }
        Ok(Err(e)) if is_routine(&e) => {
            trace!(host, port, error = %e, "probe closed");
            ProbeOutcome::Closed
        }
        Ok(Err(e)) => {
            warn!(host, port, error = %e, "probe transport error, treating port as closed");
            ProbeOutcome::Closed
        }
        Err(_) => {
            trace!(host, port, ?timeout, "probe timed out");
            ProbeOutcome::Closed
        }
    }
}

/// Errors that just mean "nothing is listening".
fn is_routine(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::TimedOut
            | io::ErrorKind::AddrNotAvailable
    )
}

/// Prober that attempts a TCP connection to a fixed host.
#[derive(Debug, Clone)]
pub struct TcpProber {
    host: String,
    timeout: Duration,
}

impl TcpProber {
    pub fn new(host: impl Into<String>, timeout: Duration) -> Self {
        Self {
            host: host.into(),
            timeout,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for TcpProber {
    fn default() -> Self {
        Self::new(DEFAULT_PROBE_HOST, DEFAULT_PROBE_TIMEOUT)
    }
}

impl ProberPort for TcpProber {
    async fn probe(&self, port: u16) -> ProbeOutcome {
        probe(&self.host, port, self.timeout).await
    }
}
