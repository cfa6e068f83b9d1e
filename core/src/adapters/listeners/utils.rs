//! Parsing helpers shared by the listener adapters.

use std::collections::BTreeMap;

use crate::domain::ObservedPort;
use crate::error::{Error, Result};

pub struct Utils;

impl Utils {
    /// Parse an address:port string.
    ///
    /// Handles multiple address formats:
    /// - IPv4: "127.0.0.1:3000" or "*:8080"
    /// - IPv6: "\[::1]:3000" or "\[fe80::1]:8080"
    pub fn parse_address(address: &str) -> Option<(String, u16)> {
        if address.starts_with('[') {
            let bracket_end = address.find(']')?;
            let port_str = address.get(bracket_end + 1..)?.strip_prefix(':')?;
            let port: u16 = port_str.parse().ok()?;
            Some((address[..=bracket_end].to_string(), port))
        } else {
            let (addr, port_str) = address.rsplit_once(':')?;
            let port: u16 = port_str.parse().ok()?;
            let addr = if addr.is_empty() { "*" } else { addr };
            Some((addr.to_string(), port))
        }
    }

    /// Classify the exit of a listener enumeration command.
    ///
    /// A non-zero exit with nothing on stderr means no sockets matched
    /// (lsof exits 1 when there are no listeners). Diagnostics on stderr
    /// mean the command itself failed, and its empty stdout must not be
    /// read as "every port closed".
    #[cfg_attr(not(target_os = "macos"), allow(dead_code))]
    pub fn check_exit(command: &str, success: bool, stderr: &[u8]) -> Result<()> {
        let stderr = String::from_utf8_lossy(stderr);
        let stderr = stderr.trim();
        if !success && !stderr.is_empty() {
            return Err(Error::CommandFailed(format!("{} failed: {}", command, stderr)));
        }
        Ok(())
    }

    /// Collapse observations to one per port, preferring the one with
    /// process information, and sort by port.
    pub fn dedup_by_port(observed: impl IntoIterator<Item = ObservedPort>) -> Vec<ObservedPort> {
        let mut by_port: BTreeMap<u16, ObservedPort> = BTreeMap::new();
        for obs in observed {
            match by_port.get(&obs.port) {
                Some(existing) if existing.pid.is_some() || obs.pid.is_none() => {}
                _ => {
                    by_port.insert(obs.port, obs);
                }
            }
        }
        by_port.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ipv4_address() {
        let (addr, port) = Utils::parse_address("127.0.0.1:3000").unwrap();
        assert_eq!(addr, "127.0.0.1");
        assert_eq!(port, 3000);

        let (addr, port) = Utils::parse_address("*:8080").unwrap();
        assert_eq!(addr, "*");
        assert_eq!(port, 8080);
    }

    #[test]
    fn test_parse_ipv6_address() {
        let (addr, port) = Utils::parse_address("[::1]:3000").unwrap();
        assert_eq!(addr, "[::1]");
        assert_eq!(port, 3000);

        assert!(Utils::parse_address("[::1]").is_none());
        assert!(Utils::parse_address("[::1]3000").is_none());
    }

    #[test]
    fn test_check_exit() {
        assert!(Utils::check_exit("lsof", true, b"").is_ok());
        // No listeners at all.
        assert!(Utils::check_exit("lsof", false, b"").is_ok());
        assert!(Utils::check_exit("lsof", false, b"  \n").is_ok());

        let result = Utils::check_exit("lsof", false, b"lsof: WARNING: can't stat() fuse\n");
        assert!(matches!(result, Err(Error::CommandFailed(msg)) if msg.contains("can't stat()")));
    }

    #[test]
    fn test_dedup_prefers_process_info() {
        let observed = vec![
            ObservedPort::new(3000),
            ObservedPort::with_process(3000, 10, "node"),
            ObservedPort::with_process(3000, 11, "node"),
            ObservedPort::new(80),
        ];
        let deduped = Utils::dedup_by_port(observed);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].port, 80);
        assert_eq!(deduped[1].pid, Some(10));
    }
}
