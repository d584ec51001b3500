use anyhow::{Context, Result};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

use crate::state::log_dir;

/// Filter from `SOJOURN_LOG` (e.g. `sojourn_core=debug`), default `warn`.
fn filter() -> EnvFilter {
    EnvFilter::try_from_env("SOJOURN_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
}

pub fn init_stderr() {
    tracing_subscriber::fmt()
        .with_env_filter(filter())
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

/// Log to `logs/sojourn.log` so the terminal UI is left alone.
pub fn init_file() -> Result<()> {
    let path = log_dir()?.join("sojourn.log");
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("open {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter())
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}
