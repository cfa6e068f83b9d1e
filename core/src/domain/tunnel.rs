//! Tunnel description models.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// Host used for the local side of every tunnel.
pub const LOCALHOST: &str = "localhost";

/// A host and port pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HostPort {
    pub host: String,
    pub port: u16,
}

impl HostPort {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn localhost(port: u16) -> Self {
        Self::new(LOCALHOST, port)
    }
}

impl std::fmt::Display for HostPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Visibility of a forwarded port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Privacy {
    #[default]
    Private,
    Public,
}

impl Privacy {
    pub fn id(self) -> &'static str {
        match self {
            Privacy::Private => "private",
            Privacy::Public => "public",
        }
    }
}

impl FromStr for Privacy {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "private" => Ok(Privacy::Private),
            "public" => Ok(Privacy::Public),
            _ => Err(ConfigurationError::InvalidValue {
                name: "privacy",
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for Privacy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// Public-facing description of a forwarded port.
///
/// Derived deterministically from the port and the configured template,
/// remote host and privacy. Recomputed on demand, never cached.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TunnelDescriptor {
    /// Always `localhost:<port>`.
    pub local_address: HostPort,
    /// `<remote host>:<port>`.
    pub remote_address: HostPort,
    pub privacy: Privacy,
    /// URI scheme of the rendered template (e.g. `http`).
    pub protocol: String,
    /// The rendered template.
    pub public_uri: String,
}

impl TunnelDescriptor {
    pub fn port(&self) -> u16 {
        self.local_address.port
    }
}

impl std::fmt::Display for TunnelDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} -> {} ({}, {})",
            self.local_address, self.public_uri, self.protocol, self.privacy
        )
    }
}

/// A privacy choice offered to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivacyOption {
    pub id: String,
    pub label: String,
    pub theme_icon: String,
}

/// Where the host should look for candidate ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidatePortSource {
    None,
    /// Listening processes.
    Process,
    /// Terminal output.
    Output,
    /// Both processes and output.
    Hybrid,
}

impl std::fmt::Display for CandidatePortSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            CandidatePortSource::None => "none",
            CandidatePortSource::Process => "process",
            CandidatePortSource::Output => "output",
            CandidatePortSource::Hybrid => "hybrid",
        })
    }
}

/// Capabilities advertised by the tunnel provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TunnelFeatures {
    pub elevation: bool,
    pub public: bool,
    pub privacy_options: Vec<PrivacyOption>,
    pub candidate_port_source: CandidatePortSource,
    /// Every detected candidate port is shown to the user.
    pub show_candidate_port: bool,
}

impl Default for TunnelFeatures {
    fn default() -> Self {
        Self {
            elevation: false,
            public: true,
            privacy_options: vec![
                PrivacyOption {
                    id: Privacy::Private.id().to_string(),
                    label: "Private".to_string(),
                    theme_icon: "lock".to_string(),
                },
                PrivacyOption {
                    id: Privacy::Public.id().to_string(),
                    label: "Public".to_string(),
                    theme_icon: "globe".to_string(),
                },
            ],
            candidate_port_source: CandidatePortSource::Hybrid,
            show_candidate_port: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_privacy_from_str() {
        assert_eq!("private".parse::<Privacy>().unwrap(), Privacy::Private);
        assert_eq!(" Public ".parse::<Privacy>().unwrap(), Privacy::Public);
        assert!("secret".parse::<Privacy>().is_err());
    }

    #[test]
    fn test_default_features() {
        let features = TunnelFeatures::default();
        assert!(!features.elevation);
        let ids: Vec<_> = features.privacy_options.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["private", "public"]);
        assert_eq!(features.candidate_port_source, CandidatePortSource::Hybrid);
        assert!(features.show_candidate_port);
    }

    #[test]
    fn test_features_json_shape() {
        let json = serde_json::to_value(TunnelFeatures::default()).unwrap();
        assert_eq!(json["candidatePortSource"], "hybrid");
        assert_eq!(json["showCandidatePort"], true);
        assert_eq!(json["privacyOptions"][1]["themeIcon"], "globe");
    }

    #[test]
    fn test_host_port_display() {
        assert_eq!(HostPort::localhost(3000).to_string(), "localhost:3000");
    }
}
