use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// `$SOJOURN_HOME`, or `~/.sojourn`.
pub fn sojourn_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("SOJOURN_HOME") {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".sojourn"))
}

pub fn ensure_sojourn_home() -> Result<PathBuf> {
    let dir = sojourn_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

fn ensure_subdir(name: &str) -> Result<PathBuf> {
    let dir = ensure_sojourn_home()?.join(name);
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn profiles_path() -> Result<PathBuf> {
    Ok(ensure_sojourn_home()?.join("profiles.json"))
}

pub fn chat_dir() -> Result<PathBuf> {
    ensure_subdir("chat")
}

pub fn log_dir() -> Result<PathBuf> {
    ensure_subdir("logs")
}
