use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::state::ensure_sojourn_home;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub chat: ChatSection,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChatSection {
    /// Delay between the user message and the assistant reply.
    pub latency_ms: u64,
    /// Append every line to ~/.sojourn/chat/YYYY-MM-DD.md.
    pub transcript: bool,
    /// Replaces the built-in greeting when set.
    pub greeting: Option<String>,
}

impl Default for ChatSection {
    fn default() -> Self {
        Self {
            latency_ms: 1500,
            transcript: true,
            greeting: None,
        }
    }
}

impl ChatSection {
    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_sojourn_home()?.join("config.toml"))
}

pub fn load_config_from(p: &Path) -> Result<Config> {
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}

pub fn show_config() -> Result<()> {
    let cfg = load_config()?;
    print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(cfg.chat.latency(), Duration::from_millis(1500));
        assert!(cfg.chat.transcript);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("config.toml");
        fs::write(&p, "[chat]\nlatency_ms = 0\n").unwrap();
        let cfg = load_config_from(&p).unwrap();
        assert_eq!(cfg.chat.latency_ms, 0);
        assert!(cfg.chat.transcript);
        assert_eq!(cfg.chat.greeting, None);
    }
}
