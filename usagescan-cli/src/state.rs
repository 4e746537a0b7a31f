use anyhow::{Context, Result};
use std::path::PathBuf;

/// `~/.usagescan`. Only resolved here; writers create it on demand.
pub fn usagescan_home() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".usagescan"))
}
