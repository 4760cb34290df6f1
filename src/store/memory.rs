use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{array, DocRef, DocumentStore, Snapshot, StoreError};

/// Process-local document store. Clones share the same documents.
#[derive(Clone, Default)]
pub struct MemoryDocumentStore {
    documents: Arc<RwLock<HashMap<DocRef, Map<String, Value>>>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn mutate<T>(
        &self,
        doc: &DocRef,
        field: &str,
        f: impl FnOnce(&mut Vec<Value>) -> Result<T, StoreError> + Send,
    ) -> Result<T, StoreError> {
        let mut documents = self.documents.write().await;
        let data = documents.entry(doc.clone()).or_default();
        array::with_array(doc, data, field, f)
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get_document(&self, doc: &DocRef) -> Result<Snapshot, StoreError> {
        let documents = self.documents.read().await;
        Ok(documents
            .get(doc)
            .map(|data| Snapshot::found(data.clone()))
            .unwrap_or_else(Snapshot::missing))
    }

    async fn array_union(&self, doc: &DocRef, field: &str, value: Value) -> Result<(), StoreError> {
        self.mutate(doc, field, |items| {
            array::union(items, value);
            Ok(())
        })
        .await
    }

    async fn array_remove(&self, doc: &DocRef, field: &str, value: Value) -> Result<(), StoreError> {
        let mut documents = self.documents.write().await;
        // Removing from a document that was never written is a no-op
        let Some(data) = documents.get_mut(doc) else {
            return Ok(());
        };
        array::with_array(doc, data, field, |items| {
            array::remove(items, &value);
            Ok(())
        })
    }

    async fn array_replace(
        &self,
        doc: &DocRef,
        field: &str,
        old: Value,
        new: Value,
    ) -> Result<(), StoreError> {
        self.mutate(doc, field, |items| {
            if array::replace(items, &old, new) {
                Ok(())
            } else {
                Err(StoreError::ElementMissing {
                    doc: doc.clone(),
                    field: field.to_string(),
                })
            }
        })
        .await
    }

    async fn set_document(&self, doc: &DocRef, data: Map<String, Value>) -> Result<(), StoreError> {
        self.documents.write().await.insert(doc.clone(), data);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc() -> DocRef {
        DocRef::new("portfolio", "projects")
    }

    #[tokio::test]
    async fn missing_document_reads_as_not_existing() {
        let store = MemoryDocumentStore::new();
        let snap = store.get_document(&doc()).await.unwrap();
        assert!(!snap.exists);
        assert!(snap.array("projects").is_none());
    }

    #[tokio::test]
    async fn union_creates_document_and_field() {
        let store = MemoryDocumentStore::new();
        store.array_union(&doc(), "projects", json!({"id": "1"})).await.unwrap();
        store.array_union(&doc(), "projects", json!({"id": "1"})).await.unwrap();

        let snap = store.get_document(&doc()).await.unwrap();
        assert!(snap.exists);
        assert_eq!(snap.array("projects").unwrap().len(), 1);
    }

    #[tokio::test]
    async fn replace_of_absent_value_fails() {
        let store = MemoryDocumentStore::new();
        store.array_union(&doc(), "projects", json!({"id": "1"})).await.unwrap();
        let err = store
            .array_replace(&doc(), "projects", json!({"id": "2"}), json!({"id": "3"}))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::ElementMissing { .. }));
    }

    #[tokio::test]
    async fn clones_share_documents() {
        let store = MemoryDocumentStore::new();
        let other = store.clone();
        store
            .set_document(&doc(), json!({"projects": []}).as_object().cloned().unwrap())
            .await
            .unwrap();
        assert!(other.get_document(&doc()).await.unwrap().exists);
    }
}
