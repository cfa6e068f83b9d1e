//! Periodic scan loop.
//!
//! One tick = sample every watched port, wait for the complete snapshot,
//! reconcile, then emit the tick's events in port order. Ticks run strictly
//! one after another on a single task, so a slow tick delays the next one
//! instead of overlapping it; ticks missed in the meantime are skipped.
//!
//! Events go through a bounded channel. When it is full the loop waits for
//! the consumer before starting the next tick: nothing is dropped, and the
//! scan rate falls to what the consumer can absorb.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::domain::{Snapshot, TransitionEvent, WatchSet};
use crate::error::Result;
use crate::ports::SamplerPort;

use super::reconciler::{Reconciler, SeenSet};

/// Default time between ticks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);

/// Default capacity of the event channel.
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Drives a sampler on a fixed period and reconciles its snapshots.
pub struct Scanner<S: SamplerPort> {
    sampler: S,
    watch_set: Arc<WatchSet>,
    interval: Duration,
    capacity: usize,
    reconciler: Arc<Mutex<Reconciler>>,
}

impl<S: SamplerPort> Scanner<S> {
    pub fn new(sampler: S, watch_set: Arc<WatchSet>, interval: Duration) -> Self {
        Self {
            sampler,
            reconciler: Arc::new(Mutex::new(Reconciler::new(watch_set.clone()))),
            watch_set,
            interval: interval.max(Duration::from_millis(1)),
            capacity: DEFAULT_EVENT_CAPACITY,
        }
    }

    /// Set the event channel capacity.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn watch_set(&self) -> &WatchSet {
        &self.watch_set
    }

    /// Copy of the current seen set.
    pub fn seen(&self) -> SeenSet {
        self.reconciler.lock().seen().clone()
    }

    /// Run a single tick now: sample, then reconcile.
    ///
    /// For callers that drive their own schedule. Must not be mixed with a
    /// running [`start`](Self::start) loop on the same scanner.
    pub async fn tick(&self) -> Result<Vec<TransitionEvent>> {
        let snapshot = self.sampler.sample(&self.watch_set).await?;
        Ok(self.reconcile(&snapshot))
    }

    /// The lock is held for the diff-and-update step only.
    fn reconcile(&self, snapshot: &Snapshot) -> Vec<TransitionEvent> {
        self.reconciler.lock().apply(snapshot, Utc::now())
    }
}

impl<S: SamplerPort + 'static> Scanner<S> {
    /// Spawn the tick loop.
    ///
    /// Returns a handle to stop it and the receiving end of the event stream.
    /// The stream ends once the loop has stopped and buffered events are read.
    pub fn start(self) -> (ScannerHandle, mpsc::Receiver<TransitionEvent>) {
        let (tx, rx) = mpsc::channel(self.capacity);
        let shared = Arc::new(Shared::default());
        let reconciler = self.reconciler.clone();

        let task = tokio::spawn(self.run(tx, shared.clone()));

        let handle = ScannerHandle {
            shared,
            reconciler,
            task,
        };
        (handle, rx)
    }

    async fn run(self, tx: mpsc::Sender<TransitionEvent>, shared: Arc<Shared>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            ports = %self.watch_set,
            interval_ms = self.interval.as_millis() as u64,
            "scanner started"
        );

        'ticks: loop {
            tokio::select! {
                biased;
                _ = shared.cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }
            if shared.is_stopped() {
                break;
            }

            let started = Instant::now();

            // A dispatched batch always runs to completion.
            let snapshot = match self.sampler.sample(&self.watch_set).await {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    warn!(error = %e, "sampling failed, skipping tick");
                    continue;
                }
            };

            if shared.is_stopped() {
                debug!("scanner stopped during sampling, discarding snapshot");
                break;
            }

            let events = self.reconcile(&snapshot);
            shared.ticks_completed.fetch_add(1, Ordering::SeqCst);

            let elapsed = started.elapsed();
            if elapsed > self.interval {
                let missed = u64::try_from(elapsed.as_nanos() / self.interval.as_nanos())
                    .unwrap_or(u64::MAX);
                shared.ticks_skipped.fetch_add(missed, Ordering::SeqCst);
                debug!(
                    elapsed_ms = elapsed.as_millis() as u64,
                    missed,
                    "tick overran the poll interval, skipping missed ticks"
                );
            }

            for event in events {
                debug!(port = event.port, kind = %event.kind, "port transition");
                tokio::select! {
                    biased;
                    _ = shared.cancel.cancelled() => break 'ticks,
                    sent = tx.send(event) => {
                        if sent.is_err() {
                            debug!("event receiver dropped, stopping scanner");
                            shared.stopped.store(true, Ordering::SeqCst);
                            break 'ticks;
                        }
                    }
                }
            }
        }

        info!(
            ticks = shared.ticks_completed.load(Ordering::SeqCst),
            "scanner stopped"
        );
    }
}

#[derive(Default)]
struct Shared {
    stopped: AtomicBool,
    cancel: CancellationToken,
    ticks_completed: AtomicU64,
    ticks_skipped: AtomicU64,
}

impl Shared {
    fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

/// Control handle for a running scanner.
pub struct ScannerHandle {
    shared: Arc<Shared>,
    reconciler: Arc<Mutex<Reconciler>>,
    task: JoinHandle<()>,
}

impl ScannerHandle {
    /// Stop the loop. Never blocks.
    ///
    /// No tick starts after this returns. A sample already in flight may
    /// still complete, but its result is discarded. No final `Closed`
    /// events are emitted.
    pub fn stop(&self) {
        self.shared.stopped.store(true, Ordering::SeqCst);
        self.shared.cancel.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.shared.is_stopped()
    }

    /// Wait for the loop task to exit.
    pub async fn join(self) {
        if let Err(e) = self.task.await {
            warn!(error = %e, "scanner task ended abnormally");
        }
    }

    /// Ticks that were sampled and reconciled.
    pub fn ticks_completed(&self) -> u64 {
        self.shared.ticks_completed.load(Ordering::SeqCst)
    }

    /// Ticks skipped because a previous tick overran the interval.
    pub fn ticks_skipped(&self) -> u64 {
        self.shared.ticks_skipped.load(Ordering::SeqCst)
    }

    /// Number of times the reconciler has been applied.
    pub fn reconciliations(&self) -> u64 {
        self.reconciler.lock().generation()
    }

    /// Copy of the current seen set.
    pub fn seen(&self) -> SeenSet {
        self.reconciler.lock().seen().clone()
    }
}
