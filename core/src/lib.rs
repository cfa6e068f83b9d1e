//! EDE Port Watch Core Library
//!
//! Discovers ports opened inside a development environment and turns them
//! into tunnel descriptions for a host editor:
//! - Periodically sample a watched set of ports (TCP probe or OS listeners)
//! - Diff each complete sample against the previous one and emit only
//!   `Opened` / `Closed` transitions
//! - Map ports to public URIs through a `{port}` template
//! - Notify once per newly opened port
//!
//! # Architecture
//! This library follows hexagonal architecture (ports & adapters):
//! - `domain`: Pure data models and rules
//! - `ports`: Trait definitions (interfaces)
//! - `adapters`: External system implementations
//! - `application`: Reconciler, resolver and scan loop
//!
//! # Platform Support
//! - Probe sampling works everywhere tokio does
//! - Listener sampling: `lsof` on macOS, `ss` or `/proc/net/tcp` on Linux

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod ports;

// Re-export domain types (primary API)
pub use domain::{
    Notification, ObservedPort, PortAttributes, ProbeOutcome, Snapshot, TransitionEvent,
    TransitionKind, TunnelDescriptor, UriTemplate, WatchSet,
};

// Re-export other commonly used types
pub use adapters::{CollectingNotifier, ListenerSampler, ProbeSampler, TcpProber};
pub use application::{Scanner, ScannerHandle, SeenSet, TunnelResolver};
pub use config::{Config, ConfigStore, SamplerKind, Settings};
pub use engine::{PortWatchEngine, RunSummary};
pub use error::{ConfigurationError, Error, Result};
