//! Process-local document store. Collections keep insertion order.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::backend::{Backend, DeleteResult, InsertOneResult, UpdateResult};
use crate::{DbError, DbResult, Document, Filter, ID_FIELD};

#[derive(Default)]
pub struct MemoryBackend {
    collections: RwLock<HashMap<String, Vec<Document>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    fn kind(&self) -> &'static str {
        "memory"
    }

    async fn insert_one(&self, collection: &str, document: Document) -> DbResult<InsertOneResult> {
        let Some(id) = document.get(ID_FIELD).cloned() else {
            return Err(DbError::MissingId {
                collection: collection.to_string(),
            });
        };

        let mut collections = self.collections.write().await;
        let documents = collections.entry(collection.to_string()).or_default();

        if documents.iter().any(|existing| existing.get(ID_FIELD) == Some(&id)) {
            return Err(DbError::DuplicateKey {
                collection: collection.to_string(),
                key: match &id {
                    Value::String(key) => key.clone(),
                    other => other.to_string(),
                },
            });
        }

        documents.push(document);
        Ok(InsertOneResult { inserted_id: id })
    }

    async fn find_one(&self, collection: &str, filter: &Filter) -> DbResult<Option<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|documents| documents.iter().find(|doc| filter.matches(doc)))
            .cloned())
    }

    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        limit: Option<u64>,
    ) -> DbResult<Vec<Document>> {
        let collections = self.collections.read().await;
        let Some(documents) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        let limit = limit.map_or(usize::MAX, |n| usize::try_from(n).unwrap_or(usize::MAX));
        Ok(documents
            .iter()
            .filter(|doc| filter.matches(doc))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        fields: Document,
    ) -> DbResult<UpdateResult> {
        let mut collections = self.collections.write().await;
        let target = collections
            .get_mut(collection)
            .and_then(|documents| documents.iter_mut().find(|doc| filter.matches(doc)));

        let Some(document) = target else {
            return Ok(UpdateResult {
                matched_count: 0,
                modified_count: 0,
            });
        };

        let mut modified = false;
        for (field, value) in fields {
            if document.get(&field) != Some(&value) {
                document.insert(field, value);
                modified = true;
            }
        }

        Ok(UpdateResult {
            matched_count: 1,
            modified_count: u64::from(modified),
        })
    }

    async fn delete_one(&self, collection: &str, filter: &Filter) -> DbResult<DeleteResult> {
        let mut collections = self.collections.write().await;
        let Some(documents) = collections.get_mut(collection) else {
            return Ok(DeleteResult { deleted_count: 0 });
        };

        match documents.iter().position(|doc| filter.matches(doc)) {
            Some(index) => {
                documents.remove(index);
                Ok(DeleteResult { deleted_count: 1 })
            }
            None => Ok(DeleteResult { deleted_count: 0 }),
        }
    }

    async fn ping(&self) -> DbResult<()> {
        Ok(())
    }

    async fn close(&self) -> DbResult<()> {
        Ok(())
    }
}
