//! Port sampler port (interface).

use crate::domain::{Snapshot, WatchSet};
use crate::error::Result;

/// Port for producing the raw open/closed state of every watched port.
///
/// One call is one scan tick. The returned snapshot must be complete:
/// it is handed to the reconciler as-is.
pub trait SamplerPort: Send + Sync {
    /// Sample every port in the watch set.
    ///
    /// An error means the whole tick could not be sampled; the scanner skips
    /// reconciliation for that tick.
    fn sample(
        &self,
        watch_set: &WatchSet,
    ) -> impl std::future::Future<Output = Result<Snapshot>> + Send;
}
