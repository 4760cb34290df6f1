use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::{postgres::PgPoolOptions, types::Json, PgPool, Postgres, Transaction};
use tracing::info;

use super::{array, DocRef, DocumentStore, Snapshot, StoreError};

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS documents (
        collection TEXT NOT NULL,
        id TEXT NOT NULL,
        data JSONB NOT NULL DEFAULT '{}'::jsonb,
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        PRIMARY KEY (collection, id)
    )
"#;

/// Documents kept as JSONB rows keyed by `(collection, id)`.
///
/// Array mutations lock the row (`SELECT ... FOR UPDATE`) and apply the same
/// value-matching rules as the in-memory store, so both backends agree on
/// what "union" and "remove" mean for object elements.
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    /// Connect and make sure the `documents` table exists
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        info!("Connected document store to postgres");
        Ok(store)
    }

    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        Ok(())
    }

    /// Ensure the row exists so the following `FOR UPDATE` always has something to lock
    async fn ensure_row(tx: &mut Transaction<'_, Postgres>, doc: &DocRef) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO documents (collection, id) VALUES ($1, $2) ON CONFLICT DO NOTHING")
            .bind(&doc.collection)
            .bind(&doc.id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    async fn lock_row(
        tx: &mut Transaction<'_, Postgres>,
        doc: &DocRef,
    ) -> Result<Option<Map<String, Value>>, StoreError> {
        let row: Option<(Json<Map<String, Value>>,)> =
            sqlx::query_as("SELECT data FROM documents WHERE collection = $1 AND id = $2 FOR UPDATE")
                .bind(&doc.collection)
                .bind(&doc.id)
                .fetch_optional(&mut **tx)
                .await?;
        Ok(row.map(|(Json(data),)| data))
    }

    async fn write_row(
        tx: &mut Transaction<'_, Postgres>,
        doc: &DocRef,
        data: Map<String, Value>,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO documents (collection, id, data, updated_at)
            VALUES ($1, $2, $3, now())
            ON CONFLICT (collection, id)
            DO UPDATE SET data = EXCLUDED.data, updated_at = now()
            "#,
        )
        .bind(&doc.collection)
        .bind(&doc.id)
        .bind(Json(data))
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    async fn mutate(
        &self,
        doc: &DocRef,
        field: &str,
        create: bool,
        f: impl FnOnce(&mut Vec<Value>) -> Result<(), StoreError> + Send,
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        if create {
            Self::ensure_row(&mut tx, doc).await?;
        }

        let Some(mut data) = Self::lock_row(&mut tx, doc).await? else {
            // Nothing to mutate and not asked to create
            tx.rollback().await?;
            return Ok(());
        };

        array::with_array(doc, &mut data, field, f)?;
        Self::write_row(&mut tx, doc, data).await?;
        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn get_document(&self, doc: &DocRef) -> Result<Snapshot, StoreError> {
        let row: Option<(Json<Map<String, Value>>,)> =
            sqlx::query_as("SELECT data FROM documents WHERE collection = $1 AND id = $2")
                .bind(&doc.collection)
                .bind(&doc.id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(match row {
            Some((Json(data),)) => Snapshot::found(data),
            None => Snapshot::missing(),
        })
    }

    async fn array_union(&self, doc: &DocRef, field: &str, value: Value) -> Result<(), StoreError> {
        self.mutate(doc, field, true, |items| {
            array::union(items, value);
            Ok(())
        })
        .await
    }

    async fn array_remove(&self, doc: &DocRef, field: &str, value: Value) -> Result<(), StoreError> {
        self.mutate(doc, field, false, |items| {
            array::remove(items, &value);
            Ok(())
        })
        .await
    }

    async fn array_replace(
        &self,
        doc: &DocRef,
        field: &str,
        old: Value,
        new: Value,
    ) -> Result<(), StoreError> {
        let missing = StoreError::ElementMissing {
            doc: doc.clone(),
            field: field.to_string(),
        };
        self.mutate(doc, field, true, move |items| {
            if array::replace(items, &old, new) {
                Ok(())
            } else {
                Err(missing)
            }
        })
        .await
    }

    async fn set_document(&self, doc: &DocRef, data: Map<String, Value>) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        Self::write_row(&mut tx, doc, data).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
