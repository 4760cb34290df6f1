//! Write-through collections mirroring one array field of one document.

pub mod entity;
pub mod store;

use std::collections::HashMap;
use thiserror::Error;

use crate::store::StoreError;

pub use entity::{generate_key, Entity, RecordMeta};
pub use store::CollectionStore;

/// Errors from collection operations
#[derive(Debug, Error)]
pub enum CollectionError {
    #[error("{message}")]
    Validation { field: String, message: String },

    #[error("{0}")]
    Duplicate(String),

    #[error("{kind} '{key}' not found")]
    NotFound { kind: &'static str, key: String },

    #[error("Remote operation failed: {0}")]
    Remote(#[from] StoreError),

    #[error("Invalid record: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CollectionError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        CollectionError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn not_found(kind: &'static str, key: impl Into<String>) -> Self {
        CollectionError::NotFound {
            kind,
            key: key.into(),
        }
    }

    /// Field-level details for validation failures
    pub fn field_errors(&self) -> Option<HashMap<String, String>> {
        match self {
            CollectionError::Validation { field, message } => {
                Some(HashMap::from([(field.clone(), message.clone())]))
            }
            _ => None,
        }
    }
}
