use chrono::Utc;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, warn};

use super::entity::{generate_key, Entity};
use super::CollectionError;
use crate::store::{DocRef, DocumentStore, Snapshot, StoreError};

/// Fields the caller can never overwrite through a patch
const PINNED_FIELDS: [&str; 3] = ["id", "createdAt", "updatedAt"];

/// A mirrored record together with the exact value stored remotely.
/// Removal and replacement match on `raw`, so fields this build does not
/// know about never break value matching.
#[derive(Debug, Clone)]
struct Entry<T> {
    record: T,
    raw: Value,
}

/// In-memory mirror of one array field of one remote document.
///
/// Every mutation writes to the document store first and only touches the
/// mirror once that write succeeded. A failed call leaves the mirror exactly
/// as it was.
pub struct CollectionStore<T: Entity> {
    documents: Arc<dyn DocumentStore>,
    doc: DocRef,
    field: String,
    mirror: RwLock<Vec<Entry<T>>>,
    /// Bumped by every load start and every mirror mutation. A load only
    /// applies its result when nothing happened after it started.
    generation: AtomicU64,
    /// Set once a load has been applied; mutations load first until then
    loaded: AtomicBool,
    writes: Mutex<()>,
}

impl<T: Entity> CollectionStore<T> {
    pub fn new(documents: Arc<dyn DocumentStore>, doc: DocRef, field: impl Into<String>) -> Self {
        Self {
            documents,
            doc,
            field: field.into(),
            mirror: RwLock::new(Vec::new()),
            generation: AtomicU64::new(0),
            loaded: AtomicBool::new(false),
            writes: Mutex::new(()),
        }
    }

    pub fn doc(&self) -> &DocRef {
        &self.doc
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    /// Replace the mirror with the remote array. On failure the mirror keeps
    /// its previous contents.
    pub async fn load(&self) -> Result<Vec<T>, CollectionError> {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let snapshot = self.documents.get_document(&self.doc).await.map_err(|e| {
            error!("Failed to load {}.{}: {}", self.doc, self.field, e);
            CollectionError::Remote(e)
        })?;
        let entries = self.decode(&snapshot)?;

        let mut mirror = self.mirror.write().await;
        if self.generation.load(Ordering::SeqCst) != ticket {
            debug!("Discarding superseded load of {}.{}", self.doc, self.field);
            return Ok(Self::ordered(&mirror));
        }
        *mirror = entries;
        self.loaded.store(true, Ordering::SeqCst);
        debug!("Loaded {} {} record(s) from {}", mirror.len(), T::KIND, self.doc);
        Ok(Self::ordered(&mirror))
    }

    /// Load the mirror unless a load already succeeded. A store whose initial
    /// load failed would otherwise write into a remote array it never saw.
    pub async fn ensure_loaded(&self) -> Result<(), CollectionError> {
        if self.loaded.load(Ordering::SeqCst) {
            return Ok(());
        }
        debug!("Loading {}.{} before first use", self.doc, self.field);
        self.load().await.map(|_| ())
    }

    /// Current mirror in the entity's presentation order
    pub async fn list(&self) -> Vec<T> {
        Self::ordered(&self.mirror.read().await)
    }

    pub async fn get(&self, key: &str) -> Option<T> {
        self.find(|record| record.key() == key).await
    }

    pub async fn find(&self, predicate: impl Fn(&T) -> bool + Send) -> Option<T> {
        self.mirror
            .read()
            .await
            .iter()
            .find(|entry| predicate(&entry.record))
            .map(|entry| entry.record.clone())
    }

    pub async fn len(&self) -> usize {
        self.mirror.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Validate, stamp and append a new record
    pub async fn add(&self, mut candidate: T) -> Result<T, CollectionError> {
        candidate.normalize();
        candidate.validate()?;

        let _write = self.writes.lock().await;
        self.ensure_loaded().await?;
        {
            let mirror = self.mirror.read().await;
            self.check_unique(&mirror, &candidate, None)?;
        }

        let now = Utc::now();
        if candidate.key().is_empty() {
            candidate.meta_mut().id = generate_key(now);
        }
        let meta = candidate.meta_mut();
        meta.created_at = Some(now);
        meta.updated_at = Some(now);

        let raw = serde_json::to_value(&candidate)?;
        self.documents
            .array_union(&self.doc, &self.field, raw.clone())
            .await
            .map_err(|e| self.remote_failure("add", e))?;

        self.apply(|mirror| {
            mirror.push(Entry {
                record: candidate.clone(),
                raw,
            })
        })
        .await;

        info!("Added {} '{}' ({}) to {}", T::KIND, candidate.label(), candidate.key(), self.doc);
        Ok(candidate)
    }

    /// Shallow-merge `patch` over the stored record and refresh `updatedAt`.
    /// `id`, `createdAt`, `updatedAt` and the entity's managed fields in the
    /// patch are ignored.
    pub async fn update(&self, key: &str, patch: Map<String, Value>) -> Result<T, CollectionError> {
        self.modify(key, |existing| merge_patch(existing, &patch)).await
    }

    /// Replace the record under `key` with whatever `change` derives from it.
    /// The remote side sees a single keyed replace of the old value.
    pub async fn modify<F>(&self, key: &str, change: F) -> Result<T, CollectionError>
    where
        F: FnOnce(&T) -> Result<T, CollectionError> + Send,
    {
        let _write = self.writes.lock().await;
        self.ensure_loaded().await?;

        let existing = {
            let mirror = self.mirror.read().await;
            mirror
                .iter()
                .find(|entry| entry.record.key() == key)
                .cloned()
                .ok_or_else(|| CollectionError::not_found(T::KIND, key))?
        };

        let mut next = change(&existing.record)?;
        {
            let pinned = existing.record.meta();
            let meta = next.meta_mut();
            meta.id = pinned.id.clone();
            meta.created_at = pinned.created_at;
            meta.updated_at = Some(Utc::now());
        }
        next.normalize();
        next.validate()?;
        {
            let mirror = self.mirror.read().await;
            self.check_unique(&mirror, &next, Some(key))?;
        }

        let raw = serde_json::to_value(&next)?;
        if let Err(e) = self
            .documents
            .array_replace(&self.doc, &self.field, existing.raw, raw.clone())
            .await
        {
            let stale = matches!(e, StoreError::ElementMissing { .. });
            let err = self.remote_failure("update", e);
            if stale {
                // Pick up the remote change so a retry works on current data
                if let Err(reload) = self.load().await {
                    warn!("Reload of {}.{} after a conflict failed: {}", self.doc, self.field, reload);
                }
            }
            return Err(err);
        }

        self.apply(|mirror| {
            if let Some(entry) = mirror.iter_mut().find(|entry| entry.record.key() == key) {
                *entry = Entry {
                    record: next.clone(),
                    raw,
                };
            }
        })
        .await;

        info!("Updated {} '{}' ({}) in {}", T::KIND, next.label(), key, self.doc);
        Ok(next)
    }

    /// Remove the record under `key`. Returns `false` without touching the
    /// remote document when the key is not mirrored.
    pub async fn remove(&self, key: &str) -> Result<bool, CollectionError> {
        let _write = self.writes.lock().await;
        self.ensure_loaded().await?;

        let raw = {
            let mirror = self.mirror.read().await;
            match mirror.iter().find(|entry| entry.record.key() == key) {
                Some(entry) => entry.raw.clone(),
                None => {
                    debug!("Remove of unknown {} '{}' ignored", T::KIND, key);
                    return Ok(false);
                }
            }
        };

        self.documents
            .array_remove(&self.doc, &self.field, raw.clone())
            .await
            .map_err(|e| self.remote_failure("remove", e))?;

        // The remote remove drops every element equal to `raw`, so match on value
        self.apply(|mirror| mirror.retain(|entry| entry.raw != raw)).await;

        info!("Removed {} {} from {}", T::KIND, key, self.doc);
        Ok(true)
    }

    /// Sequential [`Self::remove`] per key. Stops at the first remote failure;
    /// keys removed before it stay removed.
    pub async fn remove_many<S: AsRef<str>>(&self, keys: &[S]) -> Result<usize, CollectionError> {
        let mut removed = 0;
        for key in keys {
            if self.remove(key.as_ref()).await? {
                removed += 1;
            }
        }
        Ok(removed)
    }

    fn decode(&self, snapshot: &Snapshot) -> Result<Vec<Entry<T>>, CollectionError> {
        let items = match snapshot.data.get(&self.field) {
            None => return Ok(Vec::new()),
            Some(Value::Array(items)) => items,
            Some(_) => {
                return Err(CollectionError::Remote(StoreError::NotAnArray {
                    doc: self.doc.clone(),
                    field: self.field.clone(),
                }))
            }
        };

        let mut taken = HashSet::new();
        let mut entries = Vec::with_capacity(items.len());
        for (index, raw) in items.iter().enumerate() {
            let mut record: T = serde_json::from_value(raw.clone())?;
            let backfilled = record.meta_mut().backfill_id(index);
            if !taken.insert(record.key().to_string()) && backfilled {
                // Legacy elements sharing a createdAt
                let unique = format!("{}-{}", record.key(), index);
                taken.insert(unique.clone());
                record.meta_mut().id = unique;
            }
            entries.push(Entry {
                record,
                raw: raw.clone(),
            });
        }
        Ok(entries)
    }

    fn check_unique(
        &self,
        mirror: &[Entry<T>],
        candidate: &T,
        skip_key: Option<&str>,
    ) -> Result<(), CollectionError> {
        for entry in mirror {
            let existing = &entry.record;
            if Some(existing.key()) == skip_key {
                continue;
            }
            if !candidate.key().is_empty() && existing.key() == candidate.key() {
                return Err(CollectionError::Duplicate(format!(
                    "{} with id '{}' already exists",
                    T::KIND,
                    candidate.key()
                )));
            }
            if candidate.conflicts_with(existing) {
                return Err(CollectionError::Duplicate(format!(
                    "{} '{}' already exists",
                    T::KIND,
                    candidate.label()
                )));
            }
        }
        Ok(())
    }

    async fn apply(&self, change: impl FnOnce(&mut Vec<Entry<T>>) + Send) {
        let mut mirror = self.mirror.write().await;
        change(&mut mirror);
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    fn remote_failure(&self, operation: &str, err: StoreError) -> CollectionError {
        error!("Failed to {} {} in {}.{}: {}", operation, T::KIND, self.doc, self.field, err);
        CollectionError::Remote(err)
    }

    fn ordered(mirror: &[Entry<T>]) -> Vec<T> {
        let mut records: Vec<T> = mirror.iter().map(|entry| entry.record.clone()).collect();
        T::order(&mut records);
        records
    }
}

fn merge_patch<T: Entity>(existing: &T, patch: &Map<String, Value>) -> Result<T, CollectionError> {
    let mut merged = serde_json::to_value(existing)?;
    if let Value::Object(fields) = &mut merged {
        for (name, value) in patch {
            if PINNED_FIELDS.contains(&name.as_str()) || T::managed_fields().contains(&name.as_str()) {
                continue;
            }
            fields.insert(name.clone(), value.clone());
        }
    }
    serde_json::from_value(merged)
        .map_err(|e| CollectionError::validation("patch", format!("Invalid patch: {}", e)))
}
