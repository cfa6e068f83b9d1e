//! Ports layer - Trait definitions (interfaces).
//!
//! This module defines the interfaces that the application layer uses
//! to interact with external systems. Implementations live in `adapters`.

mod notifier;
mod prober;
mod sampler;

pub use notifier::NotifierPort;
pub use prober::ProberPort;
pub use sampler::SamplerPort;
