//! Resolve-authority command.

use anyhow::Result;
use ede_core::domain::resolve_authority;

pub fn run(authority: &str, json: bool) -> Result<()> {
    let resolved = resolve_authority(authority)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&resolved)?);
    } else {
        println!("{} -> {}:{}", resolved.server_name, resolved.host, resolved.port);
    }
    Ok(())
}
