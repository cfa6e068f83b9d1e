//! Attributes command - auto-forward action for a port.

use anyhow::Result;
use ede_core::domain::AutoForwardAction;
use ede_core::PortWatchEngine;

use super::Overrides;

pub async fn run(overrides: &Overrides, port: u16, json: bool) -> Result<()> {
    let engine = PortWatchEngine::new(&overrides.load().await?)?;
    let attributes = engine.port_attributes(port);

    if json {
        println!("{}", serde_json::to_string_pretty(&attributes)?);
        return Ok(());
    }

    let action = match attributes.auto_forward_action {
        AutoForwardAction::Notify => "notify",
        AutoForwardAction::Silent => "silent",
    };
    println!("{}: {}", port, action);
    Ok(())
}
