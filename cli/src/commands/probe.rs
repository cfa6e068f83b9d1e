//! Probe command - check a single port.

use std::time::Duration;

use anyhow::Result;
use ede_core::ports::ProberPort;
use ede_core::TcpProber;

use super::Overrides;

pub async fn run(
    overrides: &Overrides,
    port: u16,
    host: Option<String>,
    timeout_ms: Option<u64>,
    json: bool,
) -> Result<()> {
    let config = overrides.load().await?;
    let host = host.unwrap_or(config.probe_host);
    let timeout_ms = timeout_ms.unwrap_or(config.probe_timeout_ms).max(1);

    let prober = TcpProber::new(host, Duration::from_millis(timeout_ms));
    let outcome = prober.probe(port).await;

    if json {
        let value = serde_json::json!({
            "host": prober.host(),
            "port": port,
            "state": outcome,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("{}:{} is {}", prober.host(), port, outcome);
    }

    Ok(())
}
