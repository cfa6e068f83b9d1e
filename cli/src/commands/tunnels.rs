//! Tunnels command - show the descriptor of every watched port.

use anyhow::Result;
use ede_core::PortWatchEngine;

use super::Overrides;

pub async fn run(overrides: &Overrides, json: bool) -> Result<()> {
    let engine = PortWatchEngine::new(&overrides.load().await?)?;
    let tunnels = engine.environment_tunnels();

    if json {
        let value = serde_json::json!({
            "tunnels": tunnels,
            "features": engine.tunnel_features(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!(
        "{:<18} {:<22} {:<8} {:<8} URI",
        "LOCAL", "REMOTE", "PROTO", "PRIVACY"
    );
    println!("{}", "-".repeat(80));
    for t in &tunnels {
        println!(
            "{:<18} {:<22} {:<8} {:<8} {}",
            t.local_address.to_string(),
            t.remote_address.to_string(),
            t.protocol,
            t.privacy.to_string(),
            t.public_uri
        );
    }

    let options: Vec<&str> = engine
        .tunnel_features()
        .privacy_options
        .iter()
        .map(|o| o.id.as_str())
        .collect();
    println!("\nPrivacy options: {}", options.join(", "));
    println!(
        "Candidate ports: {}",
        engine.tunnel_features().candidate_port_source
    );
    Ok(())
}
