//! Config command - show or initialize configuration.

use anyhow::{bail, Result};
use ede_core::{Config, PortWatchEngine};

use super::Overrides;

/// Show the effective configuration after env and flag overrides.
pub async fn show(overrides: &Overrides, json: bool) -> Result<()> {
    let store = overrides.store()?;
    let config = overrides.load().await?;

    // Validation errors surface here rather than at the next `watch`.
    PortWatchEngine::new(&config)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    println!("Config file:     {}", store.path().display());
    println!("Watched ports:   {}", config.watched_ports);
    println!("Proxy URI:       {}", config.proxy_uri);
    println!("Poll interval:   {} ms", config.poll_interval_ms);
    println!("Probe timeout:   {} ms", config.probe_timeout_ms);
    println!("Probe host:      {}", config.probe_host);
    println!("Remote host:     {}", config.remote_host);
    println!("Privacy:         {}", config.privacy);
    println!("Sampler:         {}", config.sampler);
    println!("Event capacity:  {}", config.event_capacity);
    Ok(())
}

/// Write a default configuration file, refusing to overwrite one.
pub async fn init(overrides: &Overrides) -> Result<()> {
    let store = overrides.store()?;
    if store.exists() {
        bail!("{} already exists", store.path().display());
    }

    store.save(&Config::default()).await?;
    println!("Wrote {}", store.path().display());
    Ok(())
}
