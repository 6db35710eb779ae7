use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// `$TIMEBLOCK_HOME`, or `~/.timeblock`.
pub fn timeblock_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("TIMEBLOCK_HOME") {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".timeblock"))
}

pub fn ensure_timeblock_home() -> Result<PathBuf> {
    let dir = timeblock_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}
