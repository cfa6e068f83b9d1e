//! Adapters layer - External system implementations.
//!
//! This module contains implementations of the port traits defined in `ports`.
//! Each adapter handles communication with external systems.

pub mod listeners;
pub mod notifier;
pub mod prober;
pub mod sampler;

// Re-export main types for convenience
pub use listeners::PlatformListeners;
pub use notifier::CollectingNotifier;
pub use prober::{TcpProber, DEFAULT_PROBE_HOST, DEFAULT_PROBE_TIMEOUT};
pub use sampler::{ListenerSampler, ProbeSampler};
