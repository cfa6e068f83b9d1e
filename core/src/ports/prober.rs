//! Port prober port (interface).

use crate::domain::ProbeOutcome;

/// Port for checking whether a single TCP port is listening.
///
/// Implementations decide the host and timeout. A probe never fails:
/// refusals, timeouts and socket errors all collapse to
/// [`ProbeOutcome::Closed`].
pub trait ProberPort: Send + Sync {
    /// Probe one port.
    fn probe(&self, port: u16) -> impl std::future::Future<Output = ProbeOutcome> + Send;
}
