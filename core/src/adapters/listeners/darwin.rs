//! macOS listener enumeration using lsof.

use std::process::Stdio;

use tokio::process::Command;

use crate::domain::ObservedPort;
use crate::error::{Error, Result};

use super::utils::Utils;
use super::ListenerSource;

/// macOS-specific listener enumeration.
pub struct DarwinListeners;

impl DarwinListeners {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DarwinListeners {
    fn default() -> Self {
        Self::new()
    }
}

impl ListenerSource for DarwinListeners {
    async fn listeners(&self) -> Result<Vec<ObservedPort>> {
        let output = Command::new("/usr/sbin/lsof")
            .args(["-iTCP", "-sTCP:LISTEN", "-P", "-n", "+c", "0"])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| Error::CommandFailed(format!("Failed to run lsof: {}", e)))?;

        Utils::check_exit("lsof", output.status.success(), &output.stderr)?;

        let stdout = String::from_utf8(output.stdout)
            .map_err(|e| Error::ParseError(format!("Invalid UTF-8 in lsof output: {}", e)))?;

        Ok(parse_lsof_output(&stdout))
    }
}

/// Parse `lsof -iTCP -sTCP:LISTEN -P -n` output.
fn parse_lsof_output(output: &str) -> Vec<ObservedPort> {
    let mut observed = Vec::new();

    for line in output.lines().skip(1) {
        let components: Vec<&str> = line.split_whitespace().collect();
        if components.len() < 9 {
            continue;
        }

        let process_name = components[0].replace("\\x20", " ").replace("\\x2f", "/");

        let pid: u32 = match components[1].parse() {
            Ok(p) => p,
            Err(_) => continue,
        };

        let address = components[8..]
            .iter()
            .rev()
            .find(|c| c.contains(':') && !c.starts_with("0x") && !c.starts_with("0t"));

        let Some((_, port)) = address.and_then(|a| Utils::parse_address(a)) else {
            continue;
        };

        observed.push(ObservedPort::with_process(port, pid, process_name));
    }

    Utils::dedup_by_port(observed)
}
