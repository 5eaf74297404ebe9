//! Offline fallback persistence.
//!
//! The original application leaned on ambient browser storage; here the
//! store is an explicit capability injected into callers, with a JSON file
//! as the local implementation.

mod local;

pub use local::*;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Serialize(#[from] serde_json::Error),
}

/// ESG entry held in the fallback store.
///
/// Entries carry arbitrary fields; id and audit fields are injected on save
/// when absent.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LocalEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// Storage capability for ESG entries.
///
/// The local file store is one implementation; a server-backed one can slot
/// in behind the same seam.
pub trait DataStore {
    /// Append a normalized entry and return it as stored.
    fn save_data(&self, entry: LocalEntry) -> Result<LocalEntry, StoreError>;

    /// Full list of stored entries. Missing or malformed storage reads as
    /// empty, never fails.
    fn get_stored_data(&self) -> Vec<LocalEntry>;
}
