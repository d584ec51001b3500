use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Daily chat transcript (`chat/YYYY-MM-DD.md`). A disabled log swallows writes.
pub struct ChatLog {
    path: Option<PathBuf>,
}

impl ChatLog {
    pub fn open_today(dir: &Path) -> Self {
        let today = chrono::Utc::now().format("%Y-%m-%d").to_string();
        Self {
            path: Some(dir.join(format!("{today}.md"))),
        }
    }

    pub fn disabled() -> Self {
        Self { path: None }
    }

    pub fn append_system(&mut self, msg: &str) -> Result<()> {
        self.append("system", msg)
    }

    pub fn append_user(&mut self, msg: &str) -> Result<()> {
        self.append("user", msg)
    }

    pub fn append_assistant(&mut self, msg: &str) -> Result<()> {
        self.append("assistant", msg)
    }

    fn append(&mut self, role: &str, msg: &str) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let mut f = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("open {}", path.display()))?;
        writeln!(
            f,
            "- {} [{}] {}",
            chrono::Utc::now().to_rfc3339(),
            role,
            msg.replace('\n', " ")
        )?;
        Ok(())
    }
}

/// Transcript writes never abort a turn: failures are logged and dropped.
pub fn warn_on_failure(res: Result<()>) {
    if let Err(e) = res {
        warn!(error = %format!("{e:#}"), "transcript write failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_are_flattened_and_tagged() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = ChatLog::open_today(dir.path());
        log.append_user("hello").unwrap();
        log.append_assistant("line one\nline two").unwrap();

        let file = std::fs::read_dir(dir.path()).unwrap().next().unwrap().unwrap().path();
        let body = std::fs::read_to_string(file).unwrap();
        let lines: Vec<_> = body.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("[user] hello"));
        assert!(lines[1].ends_with("[assistant] line one line two"));
    }

    #[test]
    fn test_disabled_log_writes_nothing() {
        let mut log = ChatLog::disabled();
        log.append_system("session_start").unwrap();
    }

    #[test]
    fn test_unwritable_log_errors_and_is_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = ChatLog::open_today(&dir.path().join("missing"));
        let res = log.append_user("hello");
        assert!(res.is_err());
        warn_on_failure(res);
    }
}
