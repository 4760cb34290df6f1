use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use uuid::Uuid;

use super::CollectionError;

/// Fields every stored record carries: a uniform string id plus timestamps.
/// Flattened into the record's JSON so the wire form stays
/// `{ "id": ..., "createdAt": ..., "updatedAt": ..., <payload> }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordMeta {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl RecordMeta {
    /// Id for legacy elements written without one. Derived from `createdAt`
    /// when present so it stays stable across reloads. Returns whether an id
    /// was assigned.
    pub(crate) fn backfill_id(&mut self, index: usize) -> bool {
        if !self.id.is_empty() {
            return false;
        }
        self.id = match self.created_at {
            Some(created) => format!("legacy-{}", created.timestamp_millis()),
            None => format!("legacy-{}", index),
        };
        true
    }
}

/// Client-generated, timestamp-prefixed key: `<unix millis>-<8 hex>`
pub fn generate_key(now: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}-{}", now.timestamp_millis(), &suffix[..8])
}

/// A record type that lives in one array field of one document.
pub trait Entity: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Singular name used in messages and activity entries
    const KIND: &'static str;

    fn meta(&self) -> &RecordMeta;
    fn meta_mut(&mut self) -> &mut RecordMeta;

    /// Human label for messages and the activity feed
    fn label(&self) -> &str;

    /// Required-field checks run before any network call
    fn validate(&self) -> Result<(), CollectionError>;

    /// Trim or canonicalise input before validation
    fn normalize(&mut self) {}

    /// Secondary uniqueness rule beyond the id (e.g. names)
    fn conflicts_with(&self, _other: &Self) -> bool {
        false
    }

    /// Fields only changed through dedicated operations, never by a patch
    fn managed_fields() -> &'static [&'static str] {
        &[]
    }

    /// Presentation order of [`super::CollectionStore::list`]. Insertion order by default.
    fn order(_items: &mut [Self]) {}

    fn key(&self) -> &str {
        &self.meta().id
    }
}

pub(crate) fn require_non_empty(field: &str, value: &str, message: &str) -> Result<(), CollectionError> {
    if value.trim().is_empty() {
        return Err(CollectionError::validation(field, message));
    }
    Ok(())
}
