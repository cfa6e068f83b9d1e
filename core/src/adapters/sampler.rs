//! Samplers that turn a watch set into a tick snapshot.

use futures::stream::{self, StreamExt};
use tracing::debug;

use crate::domain::{ObservedPort, ProbeOutcome, Snapshot, WatchSet};
use crate::error::Result;
use crate::ports::{ProberPort, SamplerPort};

use super::listeners::PlatformListeners;

/// Samples by probing every watched port concurrently.
///
/// Fan-out defaults to the size of the watch set; `with_concurrency` caps it.
pub struct ProbeSampler<P: ProberPort> {
    prober: P,
    concurrency: Option<usize>,
}

impl<P: ProberPort> ProbeSampler<P> {
    pub fn new(prober: P) -> Self {
        Self {
            prober,
            concurrency: None,
        }
    }

    /// Limit the number of probes in flight at once.
    pub fn with_concurrency(mut self, limit: usize) -> Self {
        self.concurrency = Some(limit.max(1));
        self
    }

    pub fn prober(&self) -> &P {
        &self.prober
    }
}

impl<P: ProberPort> SamplerPort for ProbeSampler<P> {
    async fn sample(&self, watch_set: &WatchSet) -> Result<Snapshot> {
        let limit = self.concurrency.unwrap_or(watch_set.len()).max(1);
        let prober = &self.prober;

        let results: Vec<(u16, ProbeOutcome)> = stream::iter(watch_set.iter())
            .map(|port| async move { (port, prober.probe(port).await) })
            .buffer_unordered(limit)
            .collect()
            .await;

        let mut snapshot = Snapshot::new();
        for (port, outcome) in results {
            match outcome {
                ProbeOutcome::Open => snapshot.record_open(ObservedPort::new(port)),
                ProbeOutcome::Closed => snapshot.record_closed(port),
            }
        }

        debug!(
            sampled = snapshot.len(),
            open = snapshot.open_ports().count(),
            "probe sample complete"
        );
        Ok(snapshot)
    }
}

/// Samples by enumerating the OS listening sockets once per tick.
///
/// Supplies pid and process name where the platform exposes them.
pub struct ListenerSampler {
    listeners: PlatformListeners,
}

impl ListenerSampler {
    pub fn new() -> Self {
        Self {
            listeners: PlatformListeners::new(),
        }
    }
}

impl Default for ListenerSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl SamplerPort for ListenerSampler {
    async fn sample(&self, watch_set: &WatchSet) -> Result<Snapshot> {
        let observed = self.listeners.listeners().await?;
        Ok(Snapshot::from_observed(watch_set, observed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    /// Prober with a fixed set of open ports that records peak concurrency.
    struct MockProber {
        open: Vec<u16>,
        in_flight: Arc<AtomicUsize>,
        peak: Arc<AtomicUsize>,
    }

    impl MockProber {
        fn new(open: Vec<u16>) -> Self {
            Self {
                open,
                in_flight: Arc::new(AtomicUsize::new(0)),
                peak: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    impl ProberPort for MockProber {
        async fn probe(&self, port: u16) -> ProbeOutcome {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if self.open.contains(&port) {
                ProbeOutcome::Open
            } else {
                ProbeOutcome::Closed
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_probe_sampler_covers_every_port() {
        let watch = WatchSet::parse("3000,3001,8080").unwrap();
        let sampler = ProbeSampler::new(MockProber::new(vec![3001]));

        let snapshot = sampler.sample(&watch).await.unwrap();
        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot.open_ports().collect::<Vec<_>>(), vec![3001]);
        assert_eq!(snapshot.outcome(3000), ProbeOutcome::Closed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_probe_sampler_runs_concurrently() {
        let watch = WatchSet::parse("1-8").unwrap();
        let prober = MockProber::new(vec![]);
        let peak = prober.peak.clone();

        ProbeSampler::new(prober).sample(&watch).await.unwrap();
        assert_eq!(peak.load(Ordering::SeqCst), 8);
    }

    #[tokio::test(start_paused = true)]
    async fn test_probe_sampler_respects_concurrency_limit() {
        let watch = WatchSet::parse("1-8").unwrap();
        let prober = MockProber::new(vec![]);
        let peak = prober.peak.clone();

        ProbeSampler::new(prober)
            .with_concurrency(2)
            .sample(&watch)
            .await
            .unwrap();
        assert_eq!(peak.load(Ordering::SeqCst), 2);
    }
}
