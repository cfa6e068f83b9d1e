//! CLI command implementations.

pub mod attributes;
pub mod authority;
pub mod config;
pub mod list;
pub mod probe;
pub mod tunnels;
pub mod watch;

use std::path::PathBuf;

use anyhow::Result;
use ede_core::{Config, ConfigStore};

/// Global flags that override the configuration file.
pub struct Overrides {
    pub config_path: Option<PathBuf>,
    pub ports: Option<String>,
    pub uri: Option<String>,
    pub interval_ms: Option<u64>,
}

impl Overrides {
    pub fn store(&self) -> Result<ConfigStore> {
        Ok(match &self.config_path {
            Some(path) => ConfigStore::with_path(path),
            None => ConfigStore::new()?,
        })
    }

    /// Load the file, then apply the environment and these flags on top.
    pub async fn load(&self) -> Result<Config> {
        let mut config = self.store()?.load().await?;
        config.apply_process_env()?;
        self.apply(&mut config);
        Ok(config)
    }

    fn apply(&self, config: &mut Config) {
        if let Some(ports) = &self.ports {
            config.watched_ports = ports.clone();
        }
        if let Some(uri) = &self.uri {
            config.proxy_uri = uri.clone();
        }
        if let Some(ms) = self.interval_ms {
            config.poll_interval_ms = ms;
        }
    }
}

/// Truncate `s` to at most `max` characters.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let overrides = Overrides {
            config_path: None,
            ports: Some("8080".to_string()),
            uri: None,
            interval_ms: Some(250),
        };
        let mut config = Config::default();
        overrides.apply(&mut config);

        assert_eq!(config.watched_ports, "8080");
        assert_eq!(config.proxy_uri, Config::default().proxy_uri);
        assert_eq!(config.poll_interval_ms, 250);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("node", 10), "node");
        assert_eq!(truncate("very-long-process-name", 8), "very-lo…");
    }
}
