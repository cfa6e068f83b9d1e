//! Domain layer - Pure business logic and data models.
//!
//! This module contains domain entities that represent core business concepts.
//! These types have no I/O dependencies and can be tested in isolation.

mod attributes;
mod notification;
mod observed;
mod template;
mod transition;
mod tunnel;
mod watch_set;

// Re-export all domain types
pub use attributes::{resolve_authority, AutoForwardAction, PortAttributes, ResolvedAuthority};
pub use notification::Notification;
pub use observed::{ObservedPort, ProbeOutcome, Snapshot};
pub use template::UriTemplate;
pub use transition::{TransitionEvent, TransitionKind};
pub use tunnel::{
    CandidatePortSource, HostPort, Privacy, PrivacyOption, TunnelDescriptor, TunnelFeatures,
    LOCALHOST,
};
pub use watch_set::WatchSet;
