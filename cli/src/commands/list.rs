//! List command - sample once and show every watched port.

use anyhow::Result;
use ede_core::ports::SamplerPort;
use ede_core::{ListenerSampler, ObservedPort, PortWatchEngine, ProbeOutcome, SamplerKind};
use serde::Serialize;

use super::{truncate, Overrides};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PortRow {
    port: u16,
    state: ProbeOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pid: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    process: Option<String>,
    public_uri: String,
}

pub async fn run(overrides: &Overrides, sampler: Option<SamplerKind>, json: bool) -> Result<()> {
    let mut config = overrides.load().await?;
    if let Some(kind) = sampler {
        config.sampler = kind;
    }
    let engine = PortWatchEngine::new(&config)?;

    let opened = match engine.settings().sampler {
        SamplerKind::Probe => sample_once(&engine, engine.probe_sampler()).await?,
        SamplerKind::Listeners => sample_once(&engine, ListenerSampler::new()).await?,
    };

    let rows: Vec<PortRow> = engine
        .watch_set()
        .iter()
        .map(|port| {
            let observed = opened.iter().find(|o| o.port == port);
            PortRow {
                port,
                state: if observed.is_some() {
                    ProbeOutcome::Open
                } else {
                    ProbeOutcome::Closed
                },
                pid: observed.and_then(|o| o.pid),
                process: observed.and_then(|o| o.process_hint.clone()),
                public_uri: engine.resolver().resolve(port).public_uri,
            }
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    // Table header
    println!(
        "{:<6} {:<7} {:<8} {:<20} URI",
        "PORT", "STATE", "PID", "PROCESS"
    );
    println!("{}", "-".repeat(72));

    for row in &rows {
        let pid = row.pid.map(|p| p.to_string()).unwrap_or_else(|| "-".to_string());
        let process = row
            .process
            .as_deref()
            .map(|p| truncate(p, 20))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<6} {:<7} {:<8} {:<20} {}",
            row.port,
            row.state.to_string(),
            pid,
            process,
            row.public_uri
        );
    }

    let open = rows.iter().filter(|r| r.state.is_open()).count();
    println!("\n{} of {} watched ports open", open, rows.len());
    Ok(())
}

/// Run a single tick from an empty seen set; every `Opened` event is an open port.
async fn sample_once<S: SamplerPort>(
    engine: &PortWatchEngine,
    sampler: S,
) -> Result<Vec<ObservedPort>> {
    let events = engine.scanner(sampler).tick().await?;
    Ok(events.into_iter().filter_map(|e| e.observed).collect())
}
