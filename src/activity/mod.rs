//! Reverse-chronological activity feed merged from independent sources.

pub mod collections;
pub mod github;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

pub use collections::{CollectionActivity, SkillActivity};
pub use github::CommitHistorySource;

#[derive(Debug, Error)]
pub enum ActivityError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("Unexpected status {status} from {source_name}")]
    Status { source_name: String, status: u16 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Commit,
    Project,
    Skill,
    Certification,
    Timeline,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub title: String,
    pub description: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl ActivityEntry {
    pub fn new(kind: ActivityKind, title: impl Into<String>, description: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            kind,
            title: title.into(),
            description: description.into(),
            timestamp,
            link: None,
        }
    }
}

#[async_trait]
pub trait ActivitySource: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch(&self) -> Result<Vec<ActivityEntry>, ActivityError>;
}

/// Concatenate, newest first, keep at most `limit`. Equal timestamps keep
/// source order.
pub fn merge_feed<I>(batches: I, limit: usize) -> Vec<ActivityEntry>
where
    I: IntoIterator<Item = Vec<ActivityEntry>>,
{
    let mut merged: Vec<ActivityEntry> = batches.into_iter().flatten().collect();
    merged.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    merged.truncate(limit);
    merged
}

pub struct ActivityFeed {
    sources: Vec<Arc<dyn ActivitySource>>,
    limit: usize,
}

impl ActivityFeed {
    pub fn new(limit: usize) -> Self {
        Self {
            sources: Vec::new(),
            limit,
        }
    }

    pub fn with_source(mut self, source: Arc<dyn ActivitySource>) -> Self {
        self.sources.push(source);
        self
    }

    /// Fetch every source concurrently and merge. A failing source is logged
    /// and contributes nothing; the others are unaffected.
    pub async fn recent(&self) -> Vec<ActivityEntry> {
        let fetches = self.sources.iter().map(|source| async move {
            match source.fetch().await {
                Ok(entries) => {
                    debug!("Activity source '{}' returned {} entries", source.name(), entries.len());
                    entries
                }
                Err(e) => {
                    warn!("Activity source '{}' failed: {}", source.name(), e);
                    Vec::new()
                }
            }
        });

        merge_feed(join_all(fetches).await, self.limit)
    }
}
