use std::sync::Arc;

use libris_kernel::settings::{DatabaseBackend, DatabaseSettings};
use tokio::sync::RwLock;

use crate::backend::{Backend, DeleteResult, InsertOneResult, UpdateResult};
use crate::memory::MemoryBackend;
use crate::mongo::MongoBackend;
use crate::{DbError, DbResult, Document, Filter, ID_FIELD};

/// Shared handle to the configured document store.
///
/// Cloning is cheap. The handle starts disconnected; [`Database::connect`]
/// and [`Database::close`] are driven by [`crate::DbModule`].
#[derive(Clone)]
pub struct Database {
    inner: Arc<Inner>,
}

struct Inner {
    settings: DatabaseSettings,
    backend: RwLock<Option<Arc<dyn Backend>>>,
}

impl Database {
    pub fn new(settings: DatabaseSettings) -> Self {
        Self {
            inner: Arc::new(Inner {
                settings,
                backend: RwLock::new(None),
            }),
        }
    }

    /// Disconnected handle backed by a fresh in-memory store.
    pub fn in_memory() -> Self {
        Self::new(DatabaseSettings::in_memory())
    }

    pub fn settings(&self) -> &DatabaseSettings {
        &self.inner.settings
    }

    /// Open the connection described by the settings and verify it with a ping.
    /// Connecting an already connected handle is a no-op.
    pub async fn connect(&self) -> DbResult<()> {
        let mut slot = self.inner.backend.write().await;
        if slot.is_some() {
            tracing::debug!(target: "libris-db", "database already connected");
            return Ok(());
        }

        let settings = &self.inner.settings;
        let backend: Arc<dyn Backend> = match settings.backend {
            DatabaseBackend::Mongo => {
                Arc::new(MongoBackend::connect(&settings.uri, &settings.name).await?)
            }
            DatabaseBackend::Memory => Arc::new(MemoryBackend::new()),
        };
        backend.ping().await?;

        tracing::info!(
            target: "libris-db",
            backend = backend.kind(),
            database = %settings.name,
            "connected to the document store"
        );

        *slot = Some(backend);
        Ok(())
    }

    /// Release the connection. Later operations fail with
    /// [`DbError::NotConnected`] until the handle is connected again.
    pub async fn close(&self) -> DbResult<()> {
        let backend = self.inner.backend.write().await.take();
        if let Some(backend) = backend {
            backend.close().await?;
            tracing::info!(
                target: "libris-db",
                backend = backend.kind(),
                "document store connection closed"
            );
        }
        Ok(())
    }

    pub async fn is_connected(&self) -> bool {
        self.inner.backend.read().await.is_some()
    }

    pub async fn ping(&self) -> DbResult<()> {
        self.backend().await?.ping().await
    }

    /// Handle to the named collection. Resolves the backend per call, so it
    /// may be created before the database is connected.
    pub fn collection(&self, name: impl Into<String>) -> Collection {
        Collection {
            database: self.clone(),
            name: name.into(),
        }
    }

    async fn backend(&self) -> DbResult<Arc<dyn Backend>> {
        self.inner
            .backend
            .read()
            .await
            .clone()
            .ok_or(DbError::NotConnected)
    }
}

/// Single-document operations scoped to one collection.
#[derive(Clone)]
pub struct Collection {
    database: Database,
    name: String,
}

impl Collection {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Insert a document. Callers assign the primary key.
    pub async fn insert_one(&self, document: Document) -> DbResult<InsertOneResult> {
        if !document.contains_key(ID_FIELD) {
            return Err(DbError::MissingId {
                collection: self.name.clone(),
            });
        }

        let result = self
            .database
            .backend()
            .await?
            .insert_one(&self.name, document)
            .await?;
        tracing::debug!(
            target: "libris-db",
            collection = %self.name,
            id = %result.inserted_id,
            "inserted document"
        );
        Ok(result)
    }

    pub async fn find_one(&self, filter: &Filter) -> DbResult<Option<Document>> {
        self.database
            .backend()
            .await?
            .find_one(&self.name, filter)
            .await
    }

    pub async fn find(&self, filter: &Filter, limit: Option<u64>) -> DbResult<Vec<Document>> {
        self.database
            .backend()
            .await?
            .find(&self.name, filter, limit)
            .await
    }

    /// Set `fields` on the first matching document. The primary key cannot be
    /// part of the field-set.
    pub async fn update_one(&self, filter: &Filter, fields: Document) -> DbResult<UpdateResult> {
        if fields.contains_key(ID_FIELD) {
            return Err(DbError::ImmutableField {
                field: ID_FIELD.to_string(),
            });
        }

        let result = self
            .database
            .backend()
            .await?
            .update_one(&self.name, filter, fields)
            .await?;
        tracing::debug!(
            target: "libris-db",
            collection = %self.name,
            matched = result.matched_count,
            modified = result.modified_count,
            "updated document"
        );
        Ok(result)
    }

    pub async fn delete_one(&self, filter: &Filter) -> DbResult<DeleteResult> {
        let result = self
            .database
            .backend()
            .await?
            .delete_one(&self.name, filter)
            .await?;
        tracing::debug!(
            target: "libris-db",
            collection = %self.name,
            deleted = result.deleted_count,
            "deleted document"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn operations_fail_before_connect() {
        let database = Database::in_memory();
        let books = database.collection("books");

        let err = books.find_one(&Filter::by_id("1")).await.unwrap_err();
        assert!(matches!(err, DbError::NotConnected));
        assert!(!database.is_connected().await);
    }

    #[tokio::test]
    async fn connect_close_cycle() {
        let database = Database::in_memory();
        let books = database.collection("books");

        database.connect().await.unwrap();
        database.connect().await.unwrap();
        assert!(database.is_connected().await);
        database.ping().await.unwrap();

        let mut document = Document::new();
        document.insert("_id".into(), json!("1"));
        books.insert_one(document).await.unwrap();
        assert_eq!(books.find(&Filter::all(), None).await.unwrap().len(), 1);

        database.close().await.unwrap();
        assert!(matches!(
            books.find(&Filter::all(), None).await.unwrap_err(),
            DbError::NotConnected
        ));
    }

    #[tokio::test]
    async fn primary_key_cannot_be_updated() {
        let database = Database::in_memory();
        database.connect().await.unwrap();

        let mut fields = Document::new();
        fields.insert("_id".into(), json!("other"));
        let err = database
            .collection("books")
            .update_one(&Filter::by_id("1"), fields)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::ImmutableField { ref field } if field == "_id"));
    }

    #[tokio::test]
    async fn insert_without_primary_key_is_rejected() {
        let database = Database::in_memory();
        database.connect().await.unwrap();

        let mut document = Document::new();
        document.insert("title".into(), json!("Emma"));
        let err = database
            .collection("books")
            .insert_one(document)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::MissingId { .. }));
    }

    #[tokio::test]
    async fn clones_share_one_connection() {
        let database = Database::in_memory();
        let clone = database.clone();
        database.connect().await.unwrap();
        assert!(clone.is_connected().await);
    }
}
