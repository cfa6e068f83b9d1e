//! Watched port set domain model.

use std::collections::BTreeSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// The immutable set of ports being watched.
///
/// Built once from configuration and never mutated during a run.
/// Iteration is always in ascending port order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u16>", into = "Vec<u16>")]
pub struct WatchSet {
    ports: BTreeSet<u16>,
}

impl WatchSet {
    /// Create a watch set from already-expanded port numbers.
    ///
    /// Port 0 is rejected and an empty set is an error.
    pub fn new(ports: impl IntoIterator<Item = u16>) -> Result<Self, ConfigurationError> {
        let mut set = BTreeSet::new();
        for port in ports {
            if port == 0 {
                return Err(ConfigurationError::PortOutOfRange(0));
            }
            set.insert(port);
        }

        if set.is_empty() {
            return Err(ConfigurationError::EmptyWatchSet);
        }

        Ok(Self { ports: set })
    }

    /// Parse a port spec such as `80,443,3000-4000`.
    ///
    /// Items are comma separated; each is a single port or an inclusive
    /// `start-end` range. Surrounding whitespace is ignored and duplicates
    /// collapse.
    pub fn parse(spec: &str) -> Result<Self, ConfigurationError> {
        let mut ports = BTreeSet::new();

        for item in spec.split(',') {
            let item = item.trim();
            if item.is_empty() {
                return Err(ConfigurationError::InvalidPort(item.to_string()));
            }

            if let Some((start, end)) = item.split_once('-') {
                let start = parse_port(start)?;
                let end = parse_port(end)?;
                if start > end {
                    return Err(ConfigurationError::InvalidRange { start, end });
                }
                ports.extend(start..=end);
            } else {
                ports.insert(parse_port(item)?);
            }
        }

        Self::new(ports)
    }

    /// Check whether a port is watched.
    pub fn contains(&self, port: u16) -> bool {
        self.ports.contains(&port)
    }

    /// Iterate over the watched ports in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u16> + '_ {
        self.ports.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.ports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }
}

fn parse_port(raw: &str) -> Result<u16, ConfigurationError> {
    let raw = raw.trim();
    let value: u64 = raw
        .parse()
        .map_err(|_| ConfigurationError::InvalidPort(raw.to_string()))?;

    match u16::try_from(value) {
        Ok(port) if port > 0 => Ok(port),
        _ => Err(ConfigurationError::PortOutOfRange(value)),
    }
}

impl FromStr for WatchSet {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<Vec<u16>> for WatchSet {
    type Error = ConfigurationError;

    fn try_from(ports: Vec<u16>) -> Result<Self, Self::Error> {
        Self::new(ports)
    }
}

impl From<WatchSet> for Vec<u16> {
    fn from(set: WatchSet) -> Self {
        set.ports.into_iter().collect()
    }
}

impl std::fmt::Display for WatchSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ports = self
            .ports
            .iter()
            .map(u16::to_string)
            .collect::<Vec<_>>()
            .join(",");
        write!(f, "{}", ports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_and_list() {
        let set = WatchSet::parse("3000").unwrap();
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![3000]);

        let set = WatchSet::parse("8080, 443,80").unwrap();
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![80, 443, 8080]);
    }

    #[test]
    fn test_parse_ranges_and_duplicates() {
        let set = WatchSet::parse("80,443,3000-3003,3001").unwrap();
        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec![80, 443, 3000, 3001, 3002, 3003]
        );
        assert_eq!(set.len(), 6);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert_eq!(
            WatchSet::parse("abc"),
            Err(ConfigurationError::InvalidPort("abc".to_string()))
        );
        assert_eq!(
            WatchSet::parse("70000"),
            Err(ConfigurationError::PortOutOfRange(70000))
        );
        assert_eq!(
            WatchSet::parse("0"),
            Err(ConfigurationError::PortOutOfRange(0))
        );
        assert_eq!(
            WatchSet::parse("4000-3000"),
            Err(ConfigurationError::InvalidRange {
                start: 4000,
                end: 3000
            })
        );
        assert!(WatchSet::parse("3000,,4000").is_err());
        assert!(WatchSet::parse("").is_err());
    }

    #[test]
    fn test_new_rejects_empty() {
        assert_eq!(
            WatchSet::new(Vec::new()),
            Err(ConfigurationError::EmptyWatchSet)
        );
    }

    #[test]
    fn test_display() {
        let set = WatchSet::parse("8080,3000").unwrap();
        assert_eq!(set.to_string(), "3000,8080");
    }
}
