//! Object storage seam used by the `/api/blob` endpoints.

pub mod local;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use local::LocalBlobStore;

#[derive(Debug, Error)]
pub enum BlobError {
    #[error("Invalid blob name: {0}")]
    InvalidName(String),

    #[error("Blob not found: {0}")]
    NotFound(String),

    #[error("URL does not belong to this store: {0}")]
    ForeignUrl(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlobAccess {
    #[default]
    Public,
}

#[derive(Debug, Clone, Default)]
pub struct UploadOptions {
    pub access: BlobAccess,
    /// Append a random token to the file stem so uploads never collide
    pub add_random_suffix: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadedBlob {
    pub url: String,
    pub pathname: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlobInfo {
    pub url: String,
    pub pathname: String,
    pub size: u64,
    pub uploaded_at: DateTime<Utc>,
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn upload(&self, bytes: Vec<u8>, name: &str, options: UploadOptions) -> Result<UploadedBlob, BlobError>;

    /// Every stored blob, newest first
    async fn list(&self) -> Result<Vec<BlobInfo>, BlobError>;

    async fn delete(&self, url: &str) -> Result<(), BlobError>;
}
