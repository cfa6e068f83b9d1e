//! Watch command - run the engine until Ctrl-C.

use anyhow::Result;
use ede_core::{ListenerSampler, PortWatchEngine, SamplerKind};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::Overrides;
use crate::notifier::ConsoleNotifier;

pub async fn run(overrides: &Overrides, sampler: Option<SamplerKind>, json: bool) -> Result<()> {
    let mut config = overrides.load().await?;
    if let Some(kind) = sampler {
        config.sampler = kind;
    }
    let engine = PortWatchEngine::new(&config)?;

    let shutdown = CancellationToken::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("interrupt received, stopping");
                trigger.cancel();
            }
            Err(e) => warn!(error = %e, "failed to listen for Ctrl-C"),
        }
    });

    let notifier = ConsoleNotifier::new(json);
    let summary = match engine.settings().sampler {
        SamplerKind::Probe => {
            engine
                .run(engine.probe_sampler(), &notifier, shutdown)
                .await
        }
        SamplerKind::Listeners => engine.run(ListenerSampler::new(), &notifier, shutdown).await,
    };

    if !json {
        eprintln!(
            "\n{} opened, {} closed over {} ticks",
            summary.opened, summary.closed, summary.ticks
        );
    }
    Ok(())
}
