//! File-backed profile store: one JSON object keyed by user id.

use anyhow::{Context, Result};
use sojourn_core::{Identity, ProfileError, ProfilePatch, ProfileRecord, ProfileStore};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use crate::state::profiles_path;

#[derive(Debug, Clone)]
pub struct JsonProfileStore {
    path: PathBuf,
}

impl JsonProfileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_all(&self) -> Result<BTreeMap<String, ProfileRecord>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let s = fs::read_to_string(&self.path).with_context(|| format!("read {}", self.path.display()))?;
        serde_json::from_str(&s).with_context(|| format!("parse {}", self.path.display()))
    }

    fn write_all(&self, records: &BTreeMap<String, ProfileRecord>) -> Result<()> {
        let s = serde_json::to_string_pretty(records)?;
        fs::write(&self.path, s).with_context(|| format!("write {}", self.path.display()))?;
        Ok(())
    }
}

fn storage(e: anyhow::Error) -> ProfileError {
    ProfileError::Storage(format!("{e:#}"))
}

impl ProfileStore for JsonProfileStore {
    fn get(&self, user_id: &str) -> Result<Option<ProfileRecord>, ProfileError> {
        Ok(self.read_all().map_err(storage)?.remove(user_id))
    }

    fn upsert(&mut self, user_id: &str, patch: &ProfilePatch) -> Result<ProfileRecord, ProfileError> {
        let mut records = self.read_all().map_err(storage)?;
        let record = records
            .entry(user_id.to_string())
            .or_insert_with(|| ProfileRecord::new(user_id));
        record.apply(patch);
        let out = record.clone();
        self.write_all(&records).map_err(storage)?;
        Ok(out)
    }
}

/// The store under `$SOJOURN_HOME/profiles.json`.
pub fn open_default_store() -> Result<JsonProfileStore> {
    Ok(JsonProfileStore::new(profiles_path()?))
}

pub fn show_profile(identity: &Identity) -> Result<()> {
    let Some(user_id) = identity.user_id() else {
        anyhow::bail!("not signed in (run: sojourn auth sign-in --user <id>, or pass --user)");
    };
    let store = open_default_store()?;
    match store.get(user_id)? {
        Some(rec) => println!("{}", serde_json::to_string_pretty(&rec)?),
        None => println!("No profile stored for {user_id}"),
    }
    Ok(())
}
