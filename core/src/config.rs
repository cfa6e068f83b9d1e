//! Configuration for the port watcher.
//!
//! Stored as JSON at `~/.ede/config.json`. Values are layered: defaults,
//! then the file, then `EDE_*` environment variables, then whatever the
//! host (the CLI) overrides. [`Config::validate`] turns the raw values into
//! [`Settings`] and is the single fail-fast point.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::adapters::{DEFAULT_PROBE_HOST, DEFAULT_PROBE_TIMEOUT};
use crate::application::{DEFAULT_EVENT_CAPACITY, DEFAULT_POLL_INTERVAL, DEFAULT_PROXY_URI};
use crate::domain::{Privacy, UriTemplate, WatchSet};
use crate::error::{ConfigurationError, Error, Result};

/// Environment variable holding the port spec.
pub const ENV_PROXY_PORTS: &str = "EDE_PROXY_PORTS";
/// Environment variable holding the URI template.
pub const ENV_PROXY_URI: &str = "EDE_PROXY_URI";
/// Environment variable holding the poll interval in milliseconds.
pub const ENV_POLL_INTERVAL_MS: &str = "EDE_POLL_INTERVAL_MS";
/// Environment variable holding the probe timeout in milliseconds.
pub const ENV_PROBE_TIMEOUT_MS: &str = "EDE_PROBE_TIMEOUT_MS";
/// Environment variable holding the remote host.
pub const ENV_REMOTE_HOST: &str = "EDE_REMOTE_HOST";

const DEFAULT_WATCHED_PORTS: &str = "3000";
const DEFAULT_REMOTE_HOST: &str = "localhost";

/// How a tick samples the watched ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SamplerKind {
    /// TCP connect to every watched port.
    #[default]
    Probe,
    /// Enumerate the OS listening sockets.
    Listeners,
}

impl SamplerKind {
    pub fn id(self) -> &'static str {
        match self {
            SamplerKind::Probe => "probe",
            SamplerKind::Listeners => "listeners",
        }
    }
}

impl FromStr for SamplerKind {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "probe" => Ok(SamplerKind::Probe),
            "listeners" => Ok(SamplerKind::Listeners),
            _ => Err(ConfigurationError::InvalidValue {
                name: "sampler",
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for SamplerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// Raw configuration values as stored on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Port spec, e.g. `3000,8080-8090`.
    pub watched_ports: String,

    /// URI template with a `{port}` placeholder.
    pub proxy_uri: String,

    /// Time between ticks.
    pub poll_interval_ms: u64,

    /// Per-probe connect timeout.
    pub probe_timeout_ms: u64,

    /// Host the prober connects to.
    pub probe_host: String,

    /// Host used for the remote side of tunnel descriptors.
    pub remote_host: String,

    pub privacy: Privacy,

    pub sampler: SamplerKind,

    /// Capacity of the event channel.
    pub event_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            watched_ports: DEFAULT_WATCHED_PORTS.to_string(),
            proxy_uri: DEFAULT_PROXY_URI.to_string(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL.as_millis() as u64,
            probe_timeout_ms: DEFAULT_PROBE_TIMEOUT.as_millis() as u64,
            probe_host: DEFAULT_PROBE_HOST.to_string(),
            remote_host: DEFAULT_REMOTE_HOST.to_string(),
            privacy: Privacy::default(),
            sampler: SamplerKind::default(),
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl Config {
    /// Apply `EDE_*` overrides from the process environment.
    pub fn apply_process_env(&mut self) -> std::result::Result<(), ConfigurationError> {
        self.apply_env(|key| std::env::var(key).ok())
    }

    /// Apply `EDE_*` overrides from `lookup`.
    ///
    /// Unset and blank variables are ignored.
    pub fn apply_env<F>(&mut self, lookup: F) -> std::result::Result<(), ConfigurationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(ports) = get(ENV_PROXY_PORTS) {
            self.watched_ports = ports;
        }
        if let Some(uri) = get(ENV_PROXY_URI) {
            self.proxy_uri = uri;
        }
        if let Some(ms) = get(ENV_POLL_INTERVAL_MS) {
            self.poll_interval_ms = parse_millis("poll interval", &ms)?;
        }
        if let Some(ms) = get(ENV_PROBE_TIMEOUT_MS) {
            self.probe_timeout_ms = parse_millis("probe timeout", &ms)?;
        }
        if let Some(host) = get(ENV_REMOTE_HOST) {
            self.remote_host = host;
        }

        Ok(())
    }

    /// Check every value and build the typed settings.
    pub fn validate(&self) -> std::result::Result<Settings, ConfigurationError> {
        let watch_set = WatchSet::parse(&self.watched_ports)?;
        let template = UriTemplate::parse(&self.proxy_uri)?;

        if self.poll_interval_ms == 0 {
            return Err(ConfigurationError::NotPositive {
                name: "poll interval",
            });
        }
        if self.probe_timeout_ms == 0 {
            return Err(ConfigurationError::NotPositive {
                name: "probe timeout",
            });
        }
        if self.event_capacity == 0 {
            return Err(ConfigurationError::NotPositive {
                name: "event capacity",
            });
        }
        if self.probe_host.trim().is_empty() {
            return Err(ConfigurationError::InvalidValue {
                name: "probe host",
                value: self.probe_host.clone(),
            });
        }

        Ok(Settings {
            watch_set,
            template,
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            probe_timeout: Duration::from_millis(self.probe_timeout_ms),
            probe_host: self.probe_host.trim().to_string(),
            remote_host: self.remote_host.clone(),
            privacy: self.privacy,
            sampler: self.sampler,
            event_capacity: self.event_capacity,
        })
    }
}

fn parse_millis(name: &'static str, value: &str) -> std::result::Result<u64, ConfigurationError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigurationError::InvalidValue {
            name,
            value: value.to_string(),
        })
}

/// Validated configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub watch_set: WatchSet,
    pub template: UriTemplate,
    pub poll_interval: Duration,
    pub probe_timeout: Duration,
    pub probe_host: String,
    pub remote_host: String,
    pub privacy: Privacy,
    pub sampler: SamplerKind,
    pub event_capacity: usize,
}

/// Reads and writes the configuration file.
pub struct ConfigStore {
    config_path: PathBuf,
}

impl ConfigStore {
    /// Create a store for `~/.ede/config.json`.
    pub fn new() -> Result<Self> {
        let home = dirs::home_dir().ok_or(ConfigurationError::NoHomeDirectory)?;
        Ok(Self {
            config_path: home.join(".ede").join("config.json"),
        })
    }

    /// Create a store for a custom path.
    pub fn with_path(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    pub fn exists(&self) -> bool {
        self.config_path.exists()
    }

    /// Load configuration from disk.
    ///
    /// A missing file yields the defaults. An unreadable or malformed file
    /// is a configuration error.
    pub async fn load(&self) -> Result<Config> {
        if !self.config_path.exists() {
            debug!(path = %self.config_path.display(), "no config file, using defaults");
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&self.config_path)
            .await
            .map_err(|e| load_error(&self.config_path, e))?;

        serde_json::from_str(&content).map_err(|e| load_error(&self.config_path, e))
    }

    /// Save configuration to disk.
    ///
    /// Writes a temp file next to the target and renames it over.
    pub async fn save(&self, config: &Config) -> Result<()> {
        if let Some(dir) = self.config_path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).await?;
        }

        let content = serde_json::to_string_pretty(config)?;
        let temp_path = self.config_path.with_extension("json.tmp");

        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(content.as_bytes()).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&temp_path, &self.config_path).await?;
        debug!(path = %self.config_path.display(), "config saved");

        Ok(())
    }
}

fn load_error(path: &Path, e: impl std::fmt::Display) -> Error {
    ConfigurationError::Load(format!("{}: {}", path.display(), e)).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;
    use tokio_test::{assert_err, assert_ok};

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_validate() {
        let settings = Config::default().validate().unwrap();
        assert_eq!(settings.watch_set.iter().collect::<Vec<_>>(), vec![3000]);
        assert_eq!(settings.template.render(3000), "http://localhost:3000");
        assert_eq!(settings.poll_interval, Duration::from_millis(2000));
        assert_eq!(settings.probe_timeout, Duration::from_millis(1000));
        assert_eq!(settings.probe_host, "127.0.0.1");
        assert_eq!(settings.remote_host, "localhost");
        assert_eq!(settings.privacy, Privacy::Private);
        assert_eq!(settings.sampler, SamplerKind::Probe);
        assert_eq!(settings.event_capacity, 64);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        assert_ok!(config.apply_env(env(&[
            (ENV_PROXY_PORTS, "3000,5173"),
            (ENV_PROXY_URI, "https://{port}.dev.example.com"),
            (ENV_POLL_INTERVAL_MS, "500"),
            (ENV_PROBE_TIMEOUT_MS, "250"),
            (ENV_REMOTE_HOST, "   "),
        ])));

        assert_eq!(config.watched_ports, "3000,5173");
        assert_eq!(config.proxy_uri, "https://{port}.dev.example.com");
        assert_eq!(config.poll_interval_ms, 500);
        assert_eq!(config.probe_timeout_ms, 250);
        // Blank values are ignored.
        assert_eq!(config.remote_host, "localhost");
    }

    #[test]
    fn test_env_rejects_non_numeric_interval() {
        let mut config = Config::default();
        let result = config.apply_env(env(&[(ENV_POLL_INTERVAL_MS, "soon")]));
        assert!(matches!(
            result,
            Err(ConfigurationError::InvalidValue { name: "poll interval", .. })
        ));
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        let config = Config {
            poll_interval_ms: 0,
            ..Config::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigurationError::NotPositive {
                name: "poll interval"
            })
        );

        let config = Config {
            event_capacity: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_ports_and_template() {
        let config = Config {
            watched_ports: "3000,0".to_string(),
            ..Config::default()
        };
        assert_err!(config.validate());

        let config = Config {
            proxy_uri: "http://localhost:{prot}".to_string(),
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigurationError::MalformedTemplate { .. })
        ));
    }

    #[test]
    fn test_sampler_kind_from_str() {
        assert_eq!("Listeners".parse::<SamplerKind>().unwrap(), SamplerKind::Listeners);
        assert_eq!(" probe ".parse::<SamplerKind>().unwrap(), SamplerKind::Probe);
        assert!("netstat".parse::<SamplerKind>().is_err());
    }

    #[tokio::test]
    async fn test_load_nonexistent() {
        let dir = tempdir().unwrap();
        let store = ConfigStore::with_path(dir.path().join("config.json"));
        assert_eq!(store.load().await.unwrap(), Config::default());
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let store = ConfigStore::with_path(dir.path().join("nested").join("config.json"));

        let config = Config {
            watched_ports: "3000-3002,8080".to_string(),
            privacy: Privacy::Public,
            sampler: SamplerKind::Listeners,
            ..Config::default()
        };
        store.save(&config).await.unwrap();

        assert!(store.exists());
        assert!(!store.path().with_extension("json.tmp").exists());
        assert_eq!(store.load().await.unwrap(), config);
    }

    #[tokio::test]
    async fn test_load_partial_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"watchedPorts": "5173", "privacy": "public"}"#).unwrap();

        let config = ConfigStore::with_path(&path).load().await.unwrap();
        assert_eq!(config.watched_ports, "5173");
        assert_eq!(config.privacy, Privacy::Public);
        assert_eq!(config.poll_interval_ms, 2000);
    }

    #[tokio::test]
    async fn test_malformed_file_is_config_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let result = ConfigStore::with_path(&path).load().await;
        assert!(matches!(
            result,
            Err(Error::Configuration(ConfigurationError::Load(_)))
        ));
    }
}
