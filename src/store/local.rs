//! File-backed implementation of [`DataStore`].

use std::fs;
use std::path::PathBuf;

use chrono::Utc;
use rand::distributions::{Alphanumeric, DistString};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};

use crate::store::{DataStore, LocalEntry, StoreError};
use crate::user::User;

const ID_SUFFIX_LENGTH: usize = 6;

/// On-disk document, mirroring the storage keys of the original client.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Document {
    #[serde(rename = "esgData", default)]
    esg_data: Vec<LocalEntry>,
    #[serde(rename = "approvedUsers", default)]
    approved_users: Vec<User>,
    #[serde(rename = "currentUser", default)]
    current_user: Option<String>,
}

/// JSON-file store for offline entries.
///
/// Read-modify-write is not atomic: the usage model assumes a single active
/// writer.
pub struct LocalStore {
    path: PathBuf,
}

impl LocalStore {
    /// Create a new [`LocalStore`] backed by `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_document(&self) -> Document {
        match fs::read(&self.path) {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|err| {
                tracing::warn!(path = %self.path.display(), error = %err, "local store unreadable, treating as empty");
                Document::default()
            }),
            Err(_) => Document::default(),
        }
    }

    fn write_document(&self, doc: &Document) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(doc)?;
        fs::write(&self.path, bytes)?;
        Ok(())
    }

    /// Remember the active user identifier.
    pub fn set_current_user(&self, email: &str) -> Result<(), StoreError> {
        let mut doc = self.read_document();
        doc.current_user = Some(email.to_owned());
        self.write_document(&doc)
    }

    /// Active user identifier, if any.
    pub fn current_user(&self) -> Option<String> {
        self.read_document().current_user
    }

    /// Append an approved user record.
    pub fn save_approved_user(&self, user: &User) -> Result<(), StoreError> {
        let mut doc = self.read_document();
        doc.approved_users.push(user.clone());
        self.write_document(&doc)
    }

    /// All locally cached approved users.
    pub fn approved_users(&self) -> Vec<User> {
        self.read_document().approved_users
    }

    fn generate_id() -> String {
        let suffix = Alphanumeric.sample_string(&mut OsRng, ID_SUFFIX_LENGTH);
        format!("{}-{}", Utc::now().timestamp_millis(), suffix)
    }
}

impl DataStore for LocalStore {
    fn save_data(&self, mut entry: LocalEntry) -> Result<LocalEntry, StoreError> {
        if entry.id.is_none() {
            entry.id = Some(Self::generate_id());
        }
        if entry.created_at.is_none() {
            entry.created_at = Some(Utc::now());
        }
        if entry.created_by.is_none() {
            entry.created_by = self.current_user();
        }

        let mut doc = self.read_document();
        doc.esg_data.push(entry.clone());
        self.write_document(&doc)?;

        Ok(entry)
    }

    fn get_stored_data(&self) -> Vec<LocalEntry> {
        self.read_document().esg_data
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn store() -> (tempfile::TempDir, LocalStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path().join("esgrid.json"));
        (dir, store)
    }

    #[test]
    fn test_save_roundtrip() {
        let (_dir, store) = store();
        store.set_current_user("user@gmail.com").unwrap();

        let mut entry = LocalEntry::default();
        entry
            .fields
            .insert("companyName".into(), json!("Acme"));
        entry.fields.insert("year".into(), json!(2024));

        let stored = store.save_data(entry).unwrap();
        assert!(stored.id.as_deref().is_some_and(|id| !id.is_empty()));
        assert!(stored.created_at.is_some());
        assert_eq!(stored.created_by.as_deref(), Some("user@gmail.com"));

        let all = store.get_stored_data();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0], stored);
        assert_eq!(all[0].fields["companyName"], json!("Acme"));
    }

    #[test]
    fn test_supplied_id_kept() {
        let (_dir, store) = store();

        let entry = LocalEntry {
            id: Some("entry-42".into()),
            ..Default::default()
        };
        let stored = store.save_data(entry).unwrap();
        assert_eq!(stored.id.as_deref(), Some("entry-42"));
    }

    #[test]
    fn test_malformed_file_reads_empty() {
        let (dir, store) = store();
        let path = dir.path().join("esgrid.json");
        std::fs::write(&path, b"{not json").unwrap();

        assert!(store.get_stored_data().is_empty());
        assert!(store.current_user().is_none());

        // Saving over a broken file starts a fresh document.
        let stored = store.save_data(LocalEntry::default()).unwrap();
        assert_eq!(store.get_stored_data().len(), 1);
        assert_eq!(store.get_stored_data()[0].id, stored.id);
    }

    #[test]
    fn test_missing_file_reads_empty() {
        let (_dir, store) = store();
        assert!(store.get_stored_data().is_empty());
    }
}
