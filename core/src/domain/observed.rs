//! Per-tick sampling models.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::WatchSet;

// ============================================================================
// ProbeOutcome
// ============================================================================

/// Liveness of a single port as seen by one sample.
///
/// This is not an error type: a closed port is routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeOutcome {
    Open,
    Closed,
}

impl ProbeOutcome {
    pub fn is_open(self) -> bool {
        matches!(self, ProbeOutcome::Open)
    }
}

impl std::fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProbeOutcome::Open => write!(f, "open"),
            ProbeOutcome::Closed => write!(f, "closed"),
        }
    }
}

// ============================================================================
// ObservedPort
// ============================================================================

/// One listener seen during a scan tick.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservedPort {
    /// The port number.
    pub port: u16,
    /// Owning process ID, when the sampler can see it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pid: Option<u32>,
    /// Process name or command hint, when the sampler can see it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process_hint: Option<String>,
}

impl ObservedPort {
    /// A bare observation with no process information (e.g. from a TCP probe).
    pub fn new(port: u16) -> Self {
        Self {
            port,
            pid: None,
            process_hint: None,
        }
    }

    /// An observation with process information (e.g. from `ss` or `lsof`).
    pub fn with_process(port: u16, pid: u32, process_hint: impl Into<String>) -> Self {
        Self {
            port,
            pid: Some(pid),
            process_hint: Some(process_hint.into()),
        }
    }
}

impl std::fmt::Display for ObservedPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.process_hint, self.pid) {
            (Some(name), Some(pid)) => write!(f, ":{} ({}, PID {})", self.port, name, pid),
            (Some(name), None) => write!(f, ":{} ({})", self.port, name),
            (None, Some(pid)) => write!(f, ":{} (PID {})", self.port, pid),
            (None, None) => write!(f, ":{}", self.port),
        }
    }
}

// ============================================================================
// Snapshot
// ============================================================================

/// The complete result of one scan tick.
///
/// Holds an outcome for every watched port. Only the scanner builds
/// snapshots, and only once all samples of a tick have completed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    outcomes: BTreeMap<u16, ProbeOutcome>,
    observed: BTreeMap<u16, ObservedPort>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a snapshot from a list of observed listeners.
    ///
    /// Every watched port gets an outcome: `Open` if it was observed,
    /// `Closed` otherwise. Observations outside the watch set are dropped.
    pub fn from_observed(
        watch_set: &WatchSet,
        observed: impl IntoIterator<Item = ObservedPort>,
    ) -> Self {
        let mut snapshot = Self::new();
        for port in watch_set.iter() {
            snapshot.outcomes.insert(port, ProbeOutcome::Closed);
        }
        for obs in observed {
            if watch_set.contains(obs.port) {
                snapshot.record_open(obs);
            }
        }
        snapshot
    }

    /// Record an open port together with its observation.
    pub fn record_open(&mut self, observed: ObservedPort) {
        self.outcomes.insert(observed.port, ProbeOutcome::Open);
        self.observed.insert(observed.port, observed);
    }

    /// Record a closed port.
    pub fn record_closed(&mut self, port: u16) {
        self.outcomes.insert(port, ProbeOutcome::Closed);
        self.observed.remove(&port);
    }

    /// Outcome for a port; ports missing from the snapshot count as closed.
    pub fn outcome(&self, port: u16) -> ProbeOutcome {
        self.outcomes
            .get(&port)
            .copied()
            .unwrap_or(ProbeOutcome::Closed)
    }

    /// The observation behind an open port.
    pub fn observed(&self, port: u16) -> Option<&ObservedPort> {
        self.observed.get(&port)
    }

    /// Open ports in ascending order.
    pub fn open_ports(&self) -> impl Iterator<Item = u16> + '_ {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| outcome.is_open())
            .map(|(port, _)| *port)
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}
