//! Application layer - Use case services.
//!
//! This module orchestrates domain logic through the ports:
//! - `reconciler`: turns complete snapshots into edge-triggered transitions
//! - `resolver`: maps ports to tunnel descriptors
//! - `scanner`: drives a sampler on a fixed period

mod reconciler;
mod resolver;
mod scanner;

pub use reconciler::{reconcile, Reconciler, SeenSet};
pub use resolver::{resolve, validate_template, TunnelResolver, DEFAULT_PROXY_URI};
pub use scanner::{Scanner, ScannerHandle, DEFAULT_EVENT_CAPACITY, DEFAULT_POLL_INTERVAL};
