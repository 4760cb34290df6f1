//! Document store seam.
//!
//! The collection layer only ever talks to a remote document through the
//! [`DocumentStore`] trait: fetch a whole document, or mutate one of its
//! array-valued fields by exact value match. Two backends are provided:
//! [`MemoryDocumentStore`] for development and tests, and [`PgDocumentStore`]
//! which keeps each document as a JSONB row.

pub mod array;
pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

pub use memory::MemoryDocumentStore;
pub use postgres::PgDocumentStore;

/// Errors from a document store backend
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Field '{field}' of {doc} is not an array")]
    NotAnArray { doc: DocRef, field: String },

    #[error("Element to replace is no longer present in '{field}' of {doc}")]
    ElementMissing { doc: DocRef, field: String },

    #[error("Document store unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Address of one document: `collection/id`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocRef {
    pub collection: String,
    pub id: String,
}

impl DocRef {
    pub fn new(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            id: id.into(),
        }
    }
}

impl std::fmt::Display for DocRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

/// Result of [`DocumentStore::get_document`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub exists: bool,
    pub data: Map<String, Value>,
}

impl Snapshot {
    pub fn missing() -> Self {
        Self::default()
    }

    pub fn found(data: Map<String, Value>) -> Self {
        Self { exists: true, data }
    }

    /// Array stored under `field`, `None` when absent or not an array.
    pub fn array(&self, field: &str) -> Option<&Vec<Value>> {
        match self.data.get(field) {
            Some(Value::Array(items)) => Some(items),
            _ => None,
        }
    }
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch the whole document.
    async fn get_document(&self, doc: &DocRef) -> Result<Snapshot, StoreError>;

    /// Append `value` to the array under `field` unless an equal element is
    /// already present. Creates the document and the field when missing.
    async fn array_union(&self, doc: &DocRef, field: &str, value: Value) -> Result<(), StoreError>;

    /// Remove every element equal to `value` from the array under `field`.
    async fn array_remove(&self, doc: &DocRef, field: &str, value: Value) -> Result<(), StoreError>;

    /// Swap the element equal to `old` for `new` in a single write. Fails with
    /// [`StoreError::ElementMissing`] when `old` is not present.
    async fn array_replace(
        &self,
        doc: &DocRef,
        field: &str,
        old: Value,
        new: Value,
    ) -> Result<(), StoreError>;

    /// Overwrite the whole document.
    async fn set_document(&self, doc: &DocRef, data: Map<String, Value>) -> Result<(), StoreError>;

    /// Backend liveness check.
    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
