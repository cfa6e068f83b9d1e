//! Linux listener enumeration using ss, falling back to /proc/net/tcp.

use std::process::Stdio;
use std::sync::LazyLock;

use regex::Regex;
use tokio::process::Command;
use tracing::debug;

use crate::domain::ObservedPort;
use crate::error::{Error, Result};

use super::utils::Utils;
use super::ListenerSource;

static SS_USERS: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r#"users:\(\("(.+?)",pid=(\d+),fd=(\d+)\)"#).ok());

/// TCP state code for LISTEN in /proc/net/tcp.
const TCP_LISTEN: &str = "0A";

const PROC_NET_TCP: [&str; 2] = ["/proc/net/tcp", "/proc/net/tcp6"];

/// Linux-specific listener enumeration.
pub struct LinuxListeners;

impl LinuxListeners {
    pub fn new() -> Self {
        Self
    }

    async fn run_ss(&self) -> Result<String> {
        let output = Command::new("ss")
            .args(["-Htlnp"])
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .output()
            .await
            .map_err(|e| Error::CommandFailed(format!("Failed to run ss: {}", e)))?;

        if !output.status.success() {
            return Err(Error::CommandFailed(format!(
                "ss exited with {}",
                output.status
            )));
        }

        String::from_utf8(output.stdout)
            .map_err(|e| Error::ParseError(format!("Invalid UTF-8 in ss output: {}", e)))
    }

    async fn read_proc_net_tcp(&self) -> Result<Vec<ObservedPort>> {
        let mut observed = Vec::new();
        let mut last_error = None;
        let mut any_read = false;

        for path in PROC_NET_TCP {
            match tokio::fs::read_to_string(path).await {
                Ok(content) => {
                    any_read = true;
                    observed.extend(parse_proc_net_tcp(&content).into_iter().map(ObservedPort::new));
                }
                Err(e) => last_error = Some(e),
            }
        }

        match (any_read, last_error) {
            (false, Some(e)) => Err(Error::Io(e)),
            _ => Ok(Utils::dedup_by_port(observed)),
        }
    }
}

impl Default for LinuxListeners {
    fn default() -> Self {
        Self::new()
    }
}

impl ListenerSource for LinuxListeners {
    async fn listeners(&self) -> Result<Vec<ObservedPort>> {
        match self.run_ss().await {
            Ok(stdout) => Ok(parse_ss_output(&stdout)),
            Err(e) => {
                debug!(error = %e, "ss unavailable, reading /proc/net/tcp");
                self.read_proc_net_tcp().await
            }
        }
    }
}

/// Parse `ss -Htlnp` output.
///
/// Expected format (no header):
/// ```text
/// LISTEN 0 4096 [::ffff:127.0.0.1]:63342 *:* users:(("rustrover",pid=53561,fd=54))
/// ```
/// The process column is absent for sockets owned by other users; those
/// ports are still reported, without process information.
fn parse_ss_output(output: &str) -> Vec<ObservedPort> {
    let mut observed = Vec::new();

    for line in output.lines() {
        let components: Vec<&str> = line.split_whitespace().collect();
        if components.len() < 5 {
            continue;
        }

        let Some((_, port)) = Utils::parse_address(components[3]) else {
            continue;
        };

        let process = components
            .get(5)
            .and_then(|users| SS_USERS.as_ref()?.captures(users))
            .and_then(|caps| {
                let pid: u32 = caps.get(2)?.as_str().parse().ok()?;
                Some((pid, caps.get(1)?.as_str().to_string()))
            });

        observed.push(match process {
            Some((pid, name)) => ObservedPort::with_process(port, pid, name),
            None => ObservedPort::new(port),
        });
    }

    Utils::dedup_by_port(observed)
}

/// Parse /proc/net/tcp or /proc/net/tcp6 and return listening ports.
///
/// ```text
///   sl  local_address rem_address   st tx_queue rx_queue ...
///    0: 00000000:0050 00000000:0000 0A 00000000:00000000 ...
/// ```
fn parse_proc_net_tcp(data: &str) -> Vec<u16> {
    data.lines()
        .skip(1)
        .filter_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < 4 || fields[3] != TCP_LISTEN {
                return None;
            }
            let (_, port_hex) = fields[1].rsplit_once(':')?;
            u16::from_str_radix(port_hex, 16).ok()
        })
        .collect()
}
