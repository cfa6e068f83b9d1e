//! Port watch engine - owner of the validated configuration.
//!
//! The engine holds the watch set, the tunnel resolver and the provider
//! capabilities, builds scanners bound to them and dispatches transitions
//! to a notifier. There is no global state: hosts create one engine and
//! hand it around.

use std::sync::Arc;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::adapters::{ProbeSampler, TcpProber};
use crate::application::{Scanner, TunnelResolver};
use crate::config::{Config, Settings};
use crate::domain::{
    Notification, PortAttributes, TransitionEvent, TransitionKind, TunnelDescriptor,
    TunnelFeatures, WatchSet,
};
use crate::error::Result;
use crate::ports::{NotifierPort, SamplerPort};

/// Counters reported when [`PortWatchEngine::run`] returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// `Opened` transitions dispatched to the notifier.
    pub opened: u64,
    /// `Closed` transitions seen.
    pub closed: u64,
    /// Ticks the scanner completed.
    pub ticks: u64,
}

/// The port watch engine.
pub struct PortWatchEngine {
    settings: Settings,
    watch_set: Arc<WatchSet>,
    resolver: TunnelResolver,
    features: TunnelFeatures,
}

impl PortWatchEngine {
    /// Validate `config` and build an engine.
    ///
    /// Every configuration defect is reported here; nothing is checked
    /// lazily once the engine exists.
    pub fn new(config: &Config) -> Result<Self> {
        Self::from_settings(config.validate()?)
    }

    pub fn from_settings(settings: Settings) -> Result<Self> {
        let resolver = TunnelResolver::new(
            settings.template.clone(),
            settings.remote_host.clone(),
            settings.privacy,
            &settings.watch_set,
        )?;

        info!(
            ports = %settings.watch_set,
            template = %settings.template,
            sampler = %settings.sampler,
            "engine configured"
        );

        Ok(Self {
            watch_set: Arc::new(settings.watch_set.clone()),
            settings,
            resolver,
            features: TunnelFeatures::default(),
        })
    }

    pub fn watch_set(&self) -> &Arc<WatchSet> {
        &self.watch_set
    }

    pub fn resolver(&self) -> &TunnelResolver {
        &self.resolver
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Descriptors for every watched port, in ascending port order.
    pub fn environment_tunnels(&self) -> Vec<TunnelDescriptor> {
        self.watch_set
            .iter()
            .map(|port| self.resolver.resolve(port))
            .collect()
    }

    pub fn port_attributes(&self, port: u16) -> PortAttributes {
        PortAttributes::classify(port, &self.watch_set)
    }

    pub fn tunnel_features(&self) -> &TunnelFeatures {
        &self.features
    }

    /// TCP prober using the configured host and timeout.
    pub fn prober(&self) -> TcpProber {
        TcpProber::new(self.settings.probe_host.clone(), self.settings.probe_timeout)
    }

    /// Probe sampler backed by [`prober`](Self::prober).
    pub fn probe_sampler(&self) -> ProbeSampler<TcpProber> {
        ProbeSampler::new(self.prober())
    }

    /// Scanner bound to the engine's watch set, interval and capacity.
    pub fn scanner<S: SamplerPort>(&self, sampler: S) -> Scanner<S> {
        Scanner::new(sampler, self.watch_set.clone(), self.settings.poll_interval)
            .with_capacity(self.settings.event_capacity)
    }

    /// Notification for a transition, if it warrants one.
    ///
    /// Only `Opened` transitions notify.
    pub fn notification_for(&self, event: &TransitionEvent) -> Option<Notification> {
        match event.kind {
            TransitionKind::Opened => Some(Notification::port_opened(
                event,
                self.resolver.resolve(event.port),
            )),
            TransitionKind::Closed => None,
        }
    }

    /// Scan until `shutdown` fires, notifying once per `Opened` transition.
    pub async fn run<S, N>(
        &self,
        sampler: S,
        notifier: &N,
        shutdown: CancellationToken,
    ) -> RunSummary
    where
        S: SamplerPort + 'static,
        N: NotifierPort,
    {
        let (handle, mut events) = self.scanner(sampler).start();
        let mut summary = RunSummary::default();

        loop {
            let event = tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                event = events.recv() => event,
            };
            let Some(event) = event else {
                debug!("event stream ended");
                break;
            };

            match self.notification_for(&event) {
                Some(notification) => {
                    info!(
                        port = event.port,
                        uri = %notification.descriptor.public_uri,
                        process = event.process_hint().unwrap_or("-"),
                        "port opened"
                    );
                    notifier.notify(&notification).await;
                    summary.opened += 1;
                }
                None => {
                    info!(port = event.port, "port closed");
                    summary.closed += 1;
                }
            }
        }

        handle.stop();
        summary.ticks = handle.ticks_completed();
        handle.join().await;

        info!(
            opened = summary.opened,
            closed = summary.closed,
            ticks = summary.ticks,
            "engine stopped"
        );
        summary
    }
}
