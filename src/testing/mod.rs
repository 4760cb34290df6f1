//! Test doubles shared by unit tests across the crate.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use crate::collection::{entity::require_non_empty, CollectionError, Entity, RecordMeta};
use crate::store::{DocRef, DocumentStore, MemoryDocumentStore, Snapshot, StoreError};

/// Minimal entity for exercising the generic collection machinery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub title: String,
    #[serde(default)]
    pub body: String,
}

impl Entity for Note {
    const KIND: &'static str = "note";

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }

    fn label(&self) -> &str {
        &self.title
    }

    fn validate(&self) -> Result<(), CollectionError> {
        require_non_empty("title", &self.title, "Please enter a title")
    }
}

pub fn note(title: &str) -> Note {
    Note {
        meta: RecordMeta::default(),
        title: title.to_string(),
        body: String::new(),
    }
}

type Hold = (Arc<Notify>, Arc<Notify>);

/// Memory store with switchable failures and a one-shot read hold
#[derive(Clone, Default)]
pub struct FlakyStore {
    inner: MemoryDocumentStore,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
    hold: Arc<Mutex<Option<Hold>>>,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inner(&self) -> &MemoryDocumentStore {
        &self.inner
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// The next `get_document` reads its snapshot, signals `entered`, then
    /// waits for `release` before returning the (by then stale) snapshot.
    pub fn hold_next_read(&self) -> (Arc<Notify>, Arc<Notify>) {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        *self.hold.lock().unwrap() = Some((entered.clone(), release.clone()));
        (entered, release)
    }

    fn check_writes(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("writes disabled".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for FlakyStore {
    async fn get_document(&self, doc: &DocRef) -> Result<Snapshot, StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("reads disabled".into()));
        }
        let snapshot = self.inner.get_document(doc).await?;
        let hold = self.hold.lock().unwrap().take();
        if let Some((entered, release)) = hold {
            entered.notify_one();
            release.notified().await;
        }
        Ok(snapshot)
    }

    async fn array_union(&self, doc: &DocRef, field: &str, value: Value) -> Result<(), StoreError> {
        self.check_writes()?;
        self.inner.array_union(doc, field, value).await
    }

    async fn array_remove(&self, doc: &DocRef, field: &str, value: Value) -> Result<(), StoreError> {
        self.check_writes()?;
        self.inner.array_remove(doc, field, value).await
    }

    async fn array_replace(
        &self,
        doc: &DocRef,
        field: &str,
        old: Value,
        new: Value,
    ) -> Result<(), StoreError> {
        self.check_writes()?;
        self.inner.array_replace(doc, field, old, new).await
    }

    async fn set_document(&self, doc: &DocRef, data: Map<String, Value>) -> Result<(), StoreError> {
        self.check_writes()?;
        self.inner.set_document(doc, data).await
    }
}
