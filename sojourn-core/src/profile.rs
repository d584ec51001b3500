//! Routing chat profile directives to a profile store.
//!
//! The engine only builds a [`ProfileUpdateRequest`]. Filtering to the
//! allow-list, stamping and the upsert happen here, against whichever
//! [`ProfileStore`] the front-end provides. The outcome is a [`ProfileNotice`]
//! shown next to the conversation; it never changes the assistant reply.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::directive::ProfileUpdates;

/// Profile fields a chat directive may modify.
pub const ALLOWED_PROFILE_FIELDS: [&str; 3] = ["name", "address", "birthdate"];

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProfileError {
    #[error("no signed-in user")]
    NotSignedIn,
    #[error("profile storage failure: {0}")]
    Storage(String),
}

/// Raw directive fields, before the allow-list is applied.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProfileUpdateRequest {
    pub fields: ProfileUpdates,
}

impl ProfileUpdateRequest {
    pub fn new(fields: ProfileUpdates) -> Self {
        Self { fields }
    }

    /// Fields that are on the allow-list.
    pub fn allowed(&self) -> ProfileUpdates {
        self.fields
            .iter()
            .filter(|(k, _)| ALLOWED_PROFILE_FIELDS.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Keys that will be ignored.
    pub fn ignored(&self) -> Vec<&str> {
        self.fields
            .keys()
            .map(String::as_str)
            .filter(|k| !ALLOWED_PROFILE_FIELDS.contains(k))
            .collect()
    }

    pub fn to_patch(&self, now: DateTime<Utc>) -> ProfilePatch {
        let allowed = self.allowed();
        ProfilePatch {
            name: allowed.get("name").cloned(),
            address: allowed.get("address").cloned(),
            birthdate: allowed.get("birthdate").cloned(),
            updated_at: now,
        }
    }
}

/// Allow-listed changes plus the update stamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub address: Option<String>,
    pub birthdate: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl ProfilePatch {
    pub fn field_names(&self) -> Vec<String> {
        let mut out = Vec::new();
        if self.name.is_some() {
            out.push("name".to_string());
        }
        if self.address.is_some() {
            out.push("address".to_string());
        }
        if self.birthdate.is_some() {
            out.push("birthdate".to_string());
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub birthdate: Option<String>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ProfileRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            address: None,
            birthdate: None,
            updated_at: None,
        }
    }

    /// Merge a patch: provided fields overwrite, absent ones are kept.
    pub fn apply(&mut self, patch: &ProfilePatch) {
        if let Some(v) = &patch.name {
            self.name = Some(v.clone());
        }
        if let Some(v) = &patch.address {
            self.address = Some(v.clone());
        }
        if let Some(v) = &patch.birthdate {
            self.birthdate = Some(v.clone());
        }
        self.updated_at = Some(patch.updated_at);
    }
}

/// Persistence collaborator for profile records, keyed by user id.
pub trait ProfileStore {
    fn get(&self, user_id: &str) -> Result<Option<ProfileRecord>, ProfileError>;

    /// Create or merge the record for `user_id`; returns the stored record.
    fn upsert(&mut self, user_id: &str, patch: &ProfilePatch) -> Result<ProfileRecord, ProfileError>;
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryProfileStore {
    records: HashMap<String, ProfileRecord>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProfileStore for InMemoryProfileStore {
    fn get(&self, user_id: &str) -> Result<Option<ProfileRecord>, ProfileError> {
        Ok(self.records.get(user_id).cloned())
    }

    fn upsert(&mut self, user_id: &str, patch: &ProfilePatch) -> Result<ProfileRecord, ProfileError> {
        let record = self
            .records
            .entry(user_id.to_string())
            .or_insert_with(|| ProfileRecord::new(user_id));
        record.apply(patch);
        Ok(record.clone())
    }
}

/// Who is signed in. Used only to route profile updates.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Identity {
    user_id: Option<String>,
}

impl Identity {
    pub fn signed_in(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
        }
    }

    pub fn anonymous() -> Self {
        Self { user_id: None }
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }
}

/// User-visible result of a profile update, shown apart from the chat reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProfileNotice {
    Saved { fields: Vec<String> },
    NotSignedIn,
    Failed { reason: String },
}

impl ProfileNotice {
    pub fn title(&self) -> &'static str {
        match self {
            ProfileNotice::Saved { .. } => "Profile updated successfully from chat.",
            ProfileNotice::NotSignedIn => "Not logged in",
            ProfileNotice::Failed { .. } => "Update Failed",
        }
    }

    pub fn description(&self) -> String {
        match self {
            ProfileNotice::Saved { fields } if fields.is_empty() => "No recognized fields; profile timestamp refreshed.".to_string(),
            ProfileNotice::Saved { fields } => format!("Updated: {}", fields.join(", ")),
            ProfileNotice::NotSignedIn => "You must be logged in to update your profile information.".to_string(),
            ProfileNotice::Failed { .. } => "Could not update your profile. Please try again later.".to_string(),
        }
    }

    pub fn is_error(&self) -> bool {
        !matches!(self, ProfileNotice::Saved { .. })
    }
}

impl std::fmt::Display for ProfileNotice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.title(), self.description())
    }
}

/// Filter, stamp and upsert a directive for the signed-in user.
pub fn apply_profile_update<S: ProfileStore + ?Sized>(
    store: &mut S,
    identity: &Identity,
    request: &ProfileUpdateRequest,
    now: DateTime<Utc>,
) -> ProfileNotice {
    let Some(user_id) = identity.user_id() else {
        warn!("profile directive received without a signed-in user");
        return ProfileNotice::NotSignedIn;
    };

    let ignored = request.ignored();
    if !ignored.is_empty() {
        info!(?ignored, "ignoring profile fields outside the allow-list");
    }

    let patch = request.to_patch(now);
    match store.upsert(user_id, &patch) {
        Ok(_) => {
            info!(user_id, fields = ?patch.field_names(), "profile updated from chat");
            ProfileNotice::Saved {
                fields: patch.field_names(),
            }
        }
        Err(e) => {
            warn!(user_id, error = %e, "profile update failed");
            ProfileNotice::Failed {
                reason: e.to_string(),
            }
        }
    }
}
