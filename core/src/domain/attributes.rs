//! Port attribute classification and remote authority resolution.

use serde::{Deserialize, Serialize};

use super::WatchSet;
use crate::error::ConfigurationError;

/// What the host should do when it detects a listening port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AutoForwardAction {
    /// Forward and tell the user.
    Notify,
    /// Ignore the port.
    Silent,
}

/// Attributes the provider reports for a detected port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortAttributes {
    pub port: u16,
    pub auto_forward_action: AutoForwardAction,
}

impl PortAttributes {
    /// Classify a port: watched ports notify, everything else is silent.
    pub fn classify(port: u16, watch_set: &WatchSet) -> Self {
        let auto_forward_action = if watch_set.contains(port) {
            AutoForwardAction::Notify
        } else {
            AutoForwardAction::Silent
        };
        Self {
            port,
            auto_forward_action,
        }
    }
}

// ============================================================================
// Remote authority
// ============================================================================

const AUTHORITY_SCHEME: &str = "ede://";

/// Host the remote server is reached through.
const AUTHORITY_HOST: &str = "localhost";

/// Port the remote server is reached through.
const AUTHORITY_PORT: u16 = 22;

/// Where a remote authority connects to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedAuthority {
    pub server_name: String,
    pub host: String,
    pub port: u16,
}

/// Resolve an `ede://<server>` authority.
///
/// The scheme prefix is optional. Any other scheme, or an empty server
/// name, is rejected.
pub fn resolve_authority(authority: &str) -> Result<ResolvedAuthority, ConfigurationError> {
    let trimmed = authority.trim();
    let server_name = trimmed.strip_prefix(AUTHORITY_SCHEME).unwrap_or(trimmed);

    if server_name.is_empty() || server_name.contains("://") {
        return Err(ConfigurationError::InvalidValue {
            name: "authority",
            value: authority.to_string(),
        });
    }

    Ok(ResolvedAuthority {
        server_name: server_name.to_string(),
        host: AUTHORITY_HOST.to_string(),
        port: AUTHORITY_PORT,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        let watch = WatchSet::parse("3000").unwrap();
        assert_eq!(
            PortAttributes::classify(3000, &watch).auto_forward_action,
            AutoForwardAction::Notify
        );
        assert_eq!(
            PortAttributes::classify(22, &watch).auto_forward_action,
            AutoForwardAction::Silent
        );
    }

    #[test]
    fn test_resolve_authority() {
        let resolved = resolve_authority("ede://workspace-1").unwrap();
        assert_eq!(resolved.server_name, "workspace-1");
        assert_eq!(resolved.host, "localhost");
        assert_eq!(resolved.port, 22);

        assert_eq!(
            resolve_authority("workspace-2").unwrap().server_name,
            "workspace-2"
        );
    }

    #[test]
    fn test_resolve_authority_rejects() {
        assert!(resolve_authority("ede://").is_err());
        assert!(resolve_authority("ssh://host").is_err());
    }
}
