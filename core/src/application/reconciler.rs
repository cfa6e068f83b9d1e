//! Edge detection over level-triggered port samples.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{ObservedPort, Snapshot, TransitionEvent, WatchSet};

/// Ports currently believed open.
///
/// Always a subset of the watch set. Only the reconciler can change it;
/// everyone else gets a read-only copy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeenSet(BTreeSet<u16>);

impl SeenSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, port: u16) -> bool {
        self.0.contains(&port)
    }

    /// Ports in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u16> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Diff a tick snapshot against the previously seen set.
///
/// Returns the new seen set and the transitions, one per port whose state
/// changed, in ascending port order. Ports outside the watch set are ignored
/// and watched ports missing from the snapshot count as closed.
pub fn reconcile(
    seen: &SeenSet,
    snapshot: &Snapshot,
    watch_set: &WatchSet,
    observed_at: DateTime<Utc>,
) -> (SeenSet, Vec<TransitionEvent>) {
    let mut next = BTreeSet::new();
    let mut events = Vec::new();

    for port in watch_set.iter() {
        let was_open = seen.contains(port);
        let is_open = snapshot.outcome(port).is_open();

        match (was_open, is_open) {
            (false, true) => {
                let observed = snapshot
                    .observed(port)
                    .cloned()
                    .unwrap_or_else(|| ObservedPort::new(port));
                events.push(TransitionEvent::opened(observed, observed_at));
                next.insert(port);
            }
            (true, false) => events.push(TransitionEvent::closed(port, observed_at)),
            (true, true) => {
                next.insert(port);
            }
            (false, false) => {}
        }
    }

    (SeenSet(next), events)
}

/// Owner of the seen set.
///
/// Every port starts closed; nothing is pre-seeded.
#[derive(Debug)]
pub struct Reconciler {
    watch_set: Arc<WatchSet>,
    seen: SeenSet,
    generation: u64,
}

impl Reconciler {
    pub fn new(watch_set: Arc<WatchSet>) -> Self {
        Self {
            watch_set,
            seen: SeenSet::new(),
            generation: 0,
        }
    }

    /// Apply one complete tick snapshot and return its transitions.
    pub fn apply(&mut self, snapshot: &Snapshot, observed_at: DateTime<Utc>) -> Vec<TransitionEvent> {
        let (next, events) = reconcile(&self.seen, snapshot, &self.watch_set, observed_at);
        self.seen = next;
        self.generation += 1;
        events
    }

    pub fn seen(&self) -> &SeenSet {
        &self.seen
    }

    /// Number of snapshots applied so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TransitionKind;

    fn watch(spec: &str) -> Arc<WatchSet> {
        Arc::new(WatchSet::parse(spec).unwrap())
    }

    fn snapshot(watch_set: &WatchSet, open: &[u16]) -> Snapshot {
        Snapshot::from_observed(watch_set, open.iter().map(|p| ObservedPort::new(*p)))
    }

    fn kinds(events: &[TransitionEvent]) -> Vec<(u16, TransitionKind)> {
        events.iter().map(|e| (e.port, e.kind)).collect()
    }

    #[test]
    fn test_steady_state_emits_nothing() {
        let ws = watch("3000,8080");
        let mut reconciler = Reconciler::new(ws.clone());

        // Always closed.
        for _ in 0..5 {
            assert!(reconciler.apply(&snapshot(&ws, &[]), Utc::now()).is_empty());
        }

        // Open once, then steady.
        assert_eq!(reconciler.apply(&snapshot(&ws, &[3000]), Utc::now()).len(), 1);
        for _ in 0..5 {
            assert!(reconciler.apply(&snapshot(&ws, &[3000]), Utc::now()).is_empty());
        }
    }

    #[test]
    fn test_one_event_per_transition() {
        let ws = watch("3000");
        let mut reconciler = Reconciler::new(ws.clone());

        let mut all = Vec::new();
        all.extend(reconciler.apply(&snapshot(&ws, &[]), Utc::now()));
        all.extend(reconciler.apply(&snapshot(&ws, &[3000]), Utc::now()));
        all.extend(reconciler.apply(&snapshot(&ws, &[]), Utc::now()));

        assert_eq!(
            kinds(&all),
            vec![(3000, TransitionKind::Opened), (3000, TransitionKind::Closed)]
        );
    }

    #[test]
    fn test_seen_set_tracks_last_open_state() {
        let ws = watch("80,443,3000");
        let mut reconciler = Reconciler::new(ws.clone());

        let ticks: [&[u16]; 4] = [&[80], &[80, 443, 9999], &[443], &[443, 3000]];
        for open in ticks {
            reconciler.apply(&snapshot(&ws, open), Utc::now());
            let expected: Vec<u16> = open.iter().copied().filter(|p| ws.contains(*p)).collect();
            assert_eq!(reconciler.seen().iter().collect::<Vec<_>>(), expected);
            assert!(reconciler.seen().iter().all(|p| ws.contains(p)));
        }
        assert_eq!(reconciler.generation(), 4);
    }

    #[test]
    fn test_ports_outside_watch_set_ignored() {
        let ws = watch("3000");
        let mut snap = Snapshot::new();
        snap.record_open(ObservedPort::new(22));

        let (seen, events) = reconcile(&SeenSet::new(), &snap, &ws, Utc::now());
        assert!(seen.is_empty());
        assert!(events.is_empty());
    }

    #[test]
    fn test_deterministic_ascending_order() {
        let ws = watch("22,80,443,3000,8080");
        let at = Utc::now();

        let mut seen_snapshot = Snapshot::new();
        seen_snapshot.record_open(ObservedPort::new(443));
        seen_snapshot.record_open(ObservedPort::new(8080));
        let (seen, _) = reconcile(&SeenSet::new(), &seen_snapshot, &ws, at);

        let tick = snapshot(&ws, &[3000, 22, 80]);
        let first = reconcile(&seen, &tick, &ws, at);
        let second = reconcile(&seen, &tick, &ws, at);
        assert_eq!(first, second);

        assert_eq!(
            kinds(&first.1),
            vec![
                (22, TransitionKind::Opened),
                (80, TransitionKind::Opened),
                (443, TransitionKind::Closed),
                (3000, TransitionKind::Opened),
                (8080, TransitionKind::Closed),
            ]
        );
    }

    #[test]
    fn test_opened_event_carries_observation() {
        let ws = watch("3000");
        let mut reconciler = Reconciler::new(ws.clone());
        let snap = Snapshot::from_observed(&ws, vec![ObservedPort::with_process(3000, 99, "node")]);

        let events = reconciler.apply(&snap, Utc::now());
        assert_eq!(events[0].process_hint(), Some("node"));
        assert_eq!(events[0].observed.as_ref().and_then(|o| o.pid), Some(99));
    }

    #[test]
    fn test_missing_watched_port_counts_as_closed() {
        let ws = watch("3000,3001");
        let mut reconciler = Reconciler::new(ws.clone());
        reconciler.apply(&snapshot(&ws, &[3000, 3001]), Utc::now());

        let mut partial = Snapshot::new();
        partial.record_open(ObservedPort::new(3000));
        let events = reconciler.apply(&partial, Utc::now());
        assert_eq!(kinds(&events), vec![(3001, TransitionKind::Closed)]);
    }
}
