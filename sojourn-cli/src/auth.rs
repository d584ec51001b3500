//! Signed-in identity, persisted in `~/.sojourn/auth.json`.
//!
//! The engine only ever sees the resulting [`Identity`]; it is used to route
//! profile updates and nothing else.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use sojourn_core::Identity;
use std::fs;
use std::path::{Path, PathBuf};

use crate::state::ensure_sojourn_home;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct AuthState {
    pub user_id: Option<String>,
    pub signed_in_at_utc: Option<String>,
}

impl AuthState {
    pub fn identity(&self) -> Identity {
        match &self.user_id {
            Some(id) => Identity::signed_in(id.clone()),
            None => Identity::anonymous(),
        }
    }
}

fn auth_path() -> Result<PathBuf> {
    Ok(ensure_sojourn_home()?.join("auth.json"))
}

pub fn load_auth_from(path: &Path) -> Result<AuthState> {
    if !path.exists() {
        return Ok(AuthState::default());
    }
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&s).with_context(|| format!("parse {}", path.display()))
}

pub fn save_auth_to(path: &Path, auth: &AuthState) -> Result<()> {
    let s = serde_json::to_string_pretty(auth)?;
    fs::write(path, s).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

pub fn load_auth() -> Result<AuthState> {
    load_auth_from(&auth_path()?)
}

pub fn sign_in(user_id: &str) -> Result<()> {
    let user_id = user_id.trim();
    if user_id.is_empty() {
        bail!("user id must not be blank");
    }
    let auth = AuthState {
        user_id: Some(user_id.to_string()),
        signed_in_at_utc: Some(chrono::Utc::now().to_rfc3339()),
    };
    save_auth_to(&auth_path()?, &auth)?;
    tracing::info!(user_id, "signed in");
    println!("Signed in as {user_id}");
    Ok(())
}

pub fn sign_out() -> Result<()> {
    save_auth_to(&auth_path()?, &AuthState::default())?;
    println!("Signed out");
    Ok(())
}

pub fn status() -> Result<()> {
    let auth = load_auth()?;
    match (&auth.user_id, &auth.signed_in_at_utc) {
        (Some(id), Some(at)) => println!("Signed in as {id} (since {at})"),
        (Some(id), None) => println!("Signed in as {id}"),
        (None, _) => println!("Not signed in. Run: sojourn auth sign-in --user <id>"),
    }
    Ok(())
}

/// `--user` wins over the stored sign-in.
pub fn resolve_identity(user_override: Option<String>) -> Result<Identity> {
    match user_override {
        Some(id) if !id.trim().is_empty() => Ok(Identity::signed_in(id.trim())),
        _ => Ok(load_auth()?.identity()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_auth_file_is_anonymous() {
        let dir = tempfile::tempdir().unwrap();
        let auth = load_auth_from(&dir.path().join("auth.json")).unwrap();
        assert_eq!(auth.identity(), Identity::anonymous());
    }

    #[test]
    fn test_auth_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("auth.json");
        let auth = AuthState {
            user_id: Some("u-42".into()),
            signed_in_at_utc: None,
        };
        save_auth_to(&p, &auth).unwrap();
        let loaded = load_auth_from(&p).unwrap();
        assert_eq!(loaded.identity().user_id(), Some("u-42"));
    }
}
