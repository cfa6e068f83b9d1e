//! Tunnel descriptor resolution.

use url::Url;

use crate::domain::{HostPort, Privacy, TunnelDescriptor, UriTemplate, WatchSet};
use crate::error::ConfigurationError;

/// Default URI template.
pub const DEFAULT_PROXY_URI: &str = "http://localhost:{port}";

/// Map a port to its tunnel descriptor.
///
/// Pure: the same inputs always yield the same descriptor. The template is
/// expected to have been validated with [`validate_template`].
pub fn resolve(
    port: u16,
    template: &UriTemplate,
    remote_host: &str,
    privacy: Privacy,
) -> TunnelDescriptor {
    let public_uri = template.render(port);
    let protocol = public_uri
        .split_once("://")
        .map(|(scheme, _)| scheme.to_ascii_lowercase())
        .unwrap_or_default();

    TunnelDescriptor {
        local_address: HostPort::localhost(port),
        remote_address: HostPort::new(remote_host, port),
        privacy,
        protocol,
        public_uri,
    }
}

/// Check that the template renders to an absolute URI with a host for
/// every watched port.
pub fn validate_template(
    template: &UriTemplate,
    watch_set: &WatchSet,
) -> Result<(), ConfigurationError> {
    let malformed = |reason: String| ConfigurationError::MalformedTemplate {
        template: template.to_string(),
        reason,
    };

    for port in watch_set.iter() {
        let rendered = template.render(port);
        let url = Url::parse(&rendered)
            .map_err(|e| malformed(format!("'{}' is not a valid URI: {}", rendered, e)))?;

        if !rendered.contains("://") || url.host_str().map_or(true, str::is_empty) {
            return Err(malformed(format!("'{}' has no host", rendered)));
        }
    }

    Ok(())
}

/// Resolver bound to the process configuration.
///
/// Construction is the fail-fast point: a resolver only exists for a
/// template that renders correctly for the whole watch set.
#[derive(Debug, Clone)]
pub struct TunnelResolver {
    template: UriTemplate,
    remote_host: String,
    privacy: Privacy,
}

impl TunnelResolver {
    pub fn new(
        template: UriTemplate,
        remote_host: impl Into<String>,
        privacy: Privacy,
        watch_set: &WatchSet,
    ) -> Result<Self, ConfigurationError> {
        let remote_host = remote_host.into();
        if remote_host.trim().is_empty() || remote_host.contains(char::is_whitespace) {
            return Err(ConfigurationError::InvalidValue {
                name: "remote host",
                value: remote_host,
            });
        }

        validate_template(&template, watch_set)?;

        Ok(Self {
            template,
            remote_host,
            privacy,
        })
    }

    pub fn resolve(&self, port: u16) -> TunnelDescriptor {
        resolve(port, &self.template, &self.remote_host, self.privacy)
    }

    pub fn template(&self) -> &UriTemplate {
        &self.template
    }

    pub fn remote_host(&self) -> &str {
        &self.remote_host
    }

    pub fn privacy(&self) -> Privacy {
        self.privacy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(s: &str) -> UriTemplate {
        UriTemplate::parse(s).unwrap()
    }

    #[test]
    fn test_resolve_localhost_template() {
        let descriptor = resolve(
            3000,
            &template(DEFAULT_PROXY_URI),
            "localhost",
            Privacy::Private,
        );
        assert_eq!(descriptor.local_address, HostPort::new("localhost", 3000));
        assert_eq!(descriptor.remote_address, HostPort::new("localhost", 3000));
        assert_eq!(descriptor.protocol, "http");
        assert_eq!(descriptor.public_uri, "http://localhost:3000");
        assert_eq!(descriptor.privacy, Privacy::Private);
    }

    #[test]
    fn test_descriptors_differ_only_in_port_fields() {
        let ws = WatchSet::parse("3000,8080").unwrap();
        let resolver = TunnelResolver::new(
            template("https://{port}-ws.example.com/"),
            "ws.example.com",
            Privacy::Public,
            &ws,
        )
        .unwrap();

        let a = resolver.resolve(3000);
        let b = resolver.resolve(8080);

        assert_eq!(a.local_address.port, 3000);
        assert_eq!(b.local_address.port, 8080);
        assert_eq!(a.public_uri, "https://3000-ws.example.com/");
        assert_eq!(b.public_uri, "https://8080-ws.example.com/");
        assert_eq!(a.local_address.host, b.local_address.host);
        assert_eq!(a.remote_address.host, b.remote_address.host);
        assert_eq!(a.privacy, b.privacy);
        assert_eq!(a.protocol, b.protocol);
        assert_eq!(a.protocol, "https");
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let t = template(DEFAULT_PROXY_URI);
        assert_eq!(
            resolve(5173, &t, "h", Privacy::Private),
            resolve(5173, &t, "h", Privacy::Private)
        );
    }

    #[test]
    fn test_validation_fails_fast() {
        let ws = WatchSet::parse("3000").unwrap();
        for bad in ["localhost:{port}", "mailto:{port}@example.com", "http://:{port}"] {
            assert!(
                TunnelResolver::new(template(bad), "localhost", Privacy::Private, &ws).is_err(),
                "expected {:?} to fail validation",
                bad
            );
        }
    }

    #[test]
    fn test_validation_checks_every_watched_port() {
        // 3000 renders to port 30000, 7000 to 70000.
        let t = template("http://localhost:{port}0");
        assert!(validate_template(&t, &WatchSet::parse("3000").unwrap()).is_ok());
        assert!(validate_template(&t, &WatchSet::parse("3000,7000").unwrap()).is_err());
    }

    #[test]
    fn test_rejects_blank_remote_host() {
        let ws = WatchSet::parse("3000").unwrap();
        let result = TunnelResolver::new(template(DEFAULT_PROXY_URI), " ", Privacy::Private, &ws);
        assert!(matches!(
            result,
            Err(ConfigurationError::InvalidValue { name: "remote host", .. })
        ));
    }
}
