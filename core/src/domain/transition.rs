//! Port state transition events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ObservedPort;

/// Direction of a port state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionKind {
    /// Port started listening since the previous tick.
    Opened,
    /// Port stopped listening since the previous tick.
    Closed,
}

impl std::fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransitionKind::Opened => write!(f, "opened"),
            TransitionKind::Closed => write!(f, "closed"),
        }
    }
}

/// A single edge-triggered change of a watched port.
///
/// Emitted at most once per actual state change per tick; never emitted for
/// a port whose state is unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionEvent {
    pub port: u16,
    pub kind: TransitionKind,
    pub observed_at: DateTime<Utc>,
    /// The sample that triggered an `Opened` event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed: Option<ObservedPort>,
}

impl TransitionEvent {
    pub fn opened(observed: ObservedPort, observed_at: DateTime<Utc>) -> Self {
        Self {
            port: observed.port,
            kind: TransitionKind::Opened,
            observed_at,
            observed: Some(observed),
        }
    }

    pub fn closed(port: u16, observed_at: DateTime<Utc>) -> Self {
        Self {
            port,
            kind: TransitionKind::Closed,
            observed_at,
            observed: None,
        }
    }

    /// Process hint carried by the triggering sample, if any.
    pub fn process_hint(&self) -> Option<&str> {
        self.observed
            .as_ref()
            .and_then(|o| o.process_hint.as_deref())
    }
}

impl std::fmt::Display for TransitionEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Port {} {}", self.port, self.kind)
    }
}
