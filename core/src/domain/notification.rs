//! User-facing notification for a newly opened port.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{TransitionEvent, TunnelDescriptor};

/// Notification raised when a watched port starts listening.
///
/// Only `Opened` transitions produce one; closures are log-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub port: u16,
    pub descriptor: TunnelDescriptor,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process_hint: Option<String>,
    pub observed_at: DateTime<Utc>,
}

impl Notification {
    /// Build a notification from an `Opened` event and its descriptor.
    pub fn port_opened(event: &TransitionEvent, descriptor: TunnelDescriptor) -> Self {
        Self {
            port: event.port,
            descriptor,
            process_hint: event.process_hint().map(str::to_string),
            observed_at: event.observed_at,
        }
    }

    /// Human-readable message, e.g.
    /// `HTTP Port 3000 is now publicly accessible at http://localhost:3000.`
    pub fn message(&self) -> String {
        let name = match &self.process_hint {
            Some(hint) => format!("Port {} ({})", self.port, hint),
            None => format!("Port {}", self.port),
        };
        format!(
            "{} {} is now publicly accessible at {}.",
            self.descriptor.protocol.to_uppercase(),
            name,
            self.descriptor.public_uri
        )
    }
}

impl std::fmt::Display for Notification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message())
    }
}
