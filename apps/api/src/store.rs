//! Credential store — a flat JSON document mapping username to
//! [`UserRecord`], loaded once at startup and rewritten wholesale on every
//! mutation. Small and single-process by design; writes are atomic
//! (temp-file-then-rename) so a crash mid-write cannot corrupt the file.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{info, warn};

use crate::hash::hash_password;
use crate::models::user::{ProfileFields, UserRecord};

const MIN_USERNAME_LEN: usize = 3;
const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Username already exists")]
    DuplicateUsername,

    #[error("Username or password too short")]
    WeakCredential,

    #[error("No such user: {0}")]
    UnknownUser(String),

    #[error("Failed to persist user store: {0}")]
    Persistence(#[source] anyhow::Error),
}

pub struct CredentialStore {
    path: PathBuf,
    users: HashMap<String, UserRecord>,
}

impl CredentialStore {
    /// Loads the mapping from `path`. A missing file is created empty; a
    /// corrupt or unreadable file falls back to an empty in-memory mapping
    /// (the accepted data-loss mode for this store).
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        let users = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<HashMap<String, UserRecord>>(&raw) {
                Ok(users) => users,
                Err(e) => {
                    warn!("User store at {} is corrupt, starting empty: {e}", path.display());
                    HashMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let store = Self {
                    path,
                    users: HashMap::new(),
                };
                store.persist().map_err(StoreError::Persistence)?;
                info!("Initialized empty user store at {}", store.path.display());
                return Ok(store);
            }
            Err(e) => {
                warn!("User store at {} is unreadable, starting empty: {e}", path.display());
                HashMap::new()
            }
        };

        info!("Loaded {} user(s) from {}", users.len(), path.display());
        Ok(Self { path, users })
    }

    /// Creates a new account. Fails on a duplicate username, a username
    /// shorter than 3 characters, or a password shorter than 6. The insert
    /// is rolled back if the file write fails.
    pub fn create(
        &mut self,
        username: &str,
        password: &str,
        profile: ProfileFields,
    ) -> Result<(), StoreError> {
        if self.users.contains_key(username) {
            return Err(StoreError::DuplicateUsername);
        }
        // character counts, not byte lengths: "日本" is 2 characters
        if username.chars().count() < MIN_USERNAME_LEN
            || password.chars().count() < MIN_PASSWORD_LEN
        {
            return Err(StoreError::WeakCredential);
        }

        self.users.insert(
            username.to_string(),
            UserRecord {
                password_hash: hash_password(password),
                gmail: profile.gmail,
                skills: profile.skills,
                education: profile.education,
                interests: profile.interests,
                created_at: Some(Utc::now()),
            },
        );

        if let Err(e) = self.persist() {
            self.users.remove(username);
            return Err(StoreError::Persistence(e));
        }
        Ok(())
    }

    /// True iff the username exists and the stored digest matches. An
    /// unknown username is indistinguishable from a wrong password.
    pub fn verify(&self, username: &str, password: &str) -> bool {
        match self.users.get(username) {
            Some(record) => record.password_hash == hash_password(password),
            None => false,
        }
    }

    /// Stored profile fields, or an all-empty default for an unknown
    /// username. Never fails.
    pub fn profile(&self, username: &str) -> ProfileFields {
        self.users
            .get(username)
            .map(UserRecord::profile)
            .unwrap_or_default()
    }

    /// Overwrites the mutable profile fields of an existing record and
    /// persists the whole mapping.
    pub fn update_profile(
        &mut self,
        username: &str,
        profile: ProfileFields,
    ) -> Result<(), StoreError> {
        let record = self
            .users
            .get_mut(username)
            .ok_or_else(|| StoreError::UnknownUser(username.to_string()))?;

        record.gmail = profile.gmail;
        record.skills = profile.skills;
        record.education = profile.education;
        record.interests = profile.interests;

        self.persist().map_err(StoreError::Persistence)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Full-file rewrite: serialize the mapping to a temp file in the same
    /// directory, then rename over the target.
    fn persist(&self) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(&self.users)?;

        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.persist(&self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_store() -> (tempfile::TempDir, CredentialStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::load(dir.path().join("users.json")).unwrap();
        (dir, store)
    }

    #[test]
    fn create_then_verify() {
        let (_dir, mut store) = empty_store();
        store
            .create("alice", "password1", ProfileFields::default())
            .unwrap();

        assert!(store.verify("alice", "password1"));
        assert!(!store.verify("alice", "wrong"));
        assert!(!store.verify("bob", "anything"));
    }

    #[test]
    fn duplicate_username_leaves_record_untouched() {
        let (_dir, mut store) = empty_store();
        let original = ProfileFields {
            gmail: "alice@example.com".into(),
            ..Default::default()
        };
        store.create("alice", "password1", original.clone()).unwrap();

        let err = store
            .create("alice", "different", ProfileFields::default())
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateUsername));

        assert_eq!(store.profile("alice"), original);
        assert!(store.verify("alice", "password1"));
    }

    #[test]
    fn weak_credentials_rejected() {
        let (_dir, mut store) = empty_store();

        let err = store
            .create("al", "password1", ProfileFields::default())
            .unwrap_err();
        assert!(matches!(err, StoreError::WeakCredential));

        let err = store
            .create("alice", "short", ProfileFields::default())
            .unwrap_err();
        assert!(matches!(err, StoreError::WeakCredential));

        assert_eq!(store.len(), 0);
    }

    #[test]
    fn length_limits_count_characters_not_bytes() {
        let (_dir, mut store) = empty_store();

        // two characters, six bytes in UTF-8
        let err = store
            .create("日本", "password1", ProfileFields::default())
            .unwrap_err();
        assert!(matches!(err, StoreError::WeakCredential));

        store
            .create("日本語", "password1", ProfileFields::default())
            .unwrap();
        assert!(store.verify("日本語", "password1"));
    }

    #[test]
    fn unknown_profile_is_empty_default() {
        let (_dir, store) = empty_store();
        assert_eq!(store.profile("nobody"), ProfileFields::default());
    }

    #[test]
    fn persist_and_reload_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.json");

        let mut store = CredentialStore::load(&path).unwrap();
        store
            .create(
                "alice",
                "password1",
                ProfileFields {
                    gmail: "alice@example.com".into(),
                    skills: "Python, SQL".into(),
                    education: "B.Sc".into(),
                    interests: "AI".into(),
                },
            )
            .unwrap();
        store.create("bob", "hunter22", ProfileFields::default()).unwrap();

        let reloaded = CredentialStore::load(&path).unwrap();
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.profile("alice"), store.profile("alice"));
        assert!(reloaded.verify("bob", "hunter22"));
    }

    #[test]
    fn missing_file_is_created_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.json");

        let store = CredentialStore::load(&path).unwrap();
        assert_eq!(store.len(), 0);
        assert!(path.exists());
    }

    #[test]
    fn corrupt_file_falls_back_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = CredentialStore::load(&path).unwrap();
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn update_profile_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.json");

        let mut store = CredentialStore::load(&path).unwrap();
        store.create("alice", "password1", ProfileFields::default()).unwrap();

        let fields = ProfileFields {
            gmail: "alice@example.com".into(),
            skills: "Rust".into(),
            education: "M.Sc".into(),
            interests: "Systems".into(),
        };
        store.update_profile("alice", fields.clone()).unwrap();

        let reloaded = CredentialStore::load(&path).unwrap();
        assert_eq!(reloaded.profile("alice"), fields);
        // password untouched by a profile update
        assert!(reloaded.verify("alice", "password1"));
    }

    #[test]
    fn create_rolls_back_when_persist_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.json");
        // a directory where the file should be makes the rename fail
        std::fs::create_dir(&path).unwrap();

        let mut store = CredentialStore::load(&path).unwrap();
        let err = store
            .create("alice", "password1", ProfileFields::default())
            .unwrap_err();

        assert!(matches!(err, StoreError::Persistence(_)));
        assert_eq!(store.len(), 0);
        assert!(!store.verify("alice", "password1"));
    }

    #[test]
    fn update_unknown_user_fails() {
        let (_dir, mut store) = empty_store();
        let err = store
            .update_profile("ghost", ProfileFields::default())
            .unwrap_err();
        assert!(matches!(err, StoreError::UnknownUser(_)));
    }
}
