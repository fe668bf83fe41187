use async_trait::async_trait;
use serde_json::Value;

use crate::{DbResult, Document, Filter};

#[derive(Debug, Clone, PartialEq)]
pub struct InsertOneResult {
    pub inserted_id: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateResult {
    /// Documents selected by the filter (0 or 1).
    pub matched_count: u64,
    /// Documents whose stored values actually changed.
    pub modified_count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteResult {
    pub deleted_count: u64,
}

/// Store implementation behind a [`crate::Database`].
///
/// Every operation targets a single named collection and at most one
/// document, except `find` which honours `limit`.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Short name used in logs.
    fn kind(&self) -> &'static str;

    async fn insert_one(&self, collection: &str, document: Document)
        -> DbResult<InsertOneResult>;

    async fn find_one(&self, collection: &str, filter: &Filter) -> DbResult<Option<Document>>;

    /// Documents in the store's natural order, at most `limit` of them.
    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        limit: Option<u64>,
    ) -> DbResult<Vec<Document>>;

    /// Merge `fields` into the first document matching `filter`.
    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        fields: Document,
    ) -> DbResult<UpdateResult>;

    async fn delete_one(&self, collection: &str, filter: &Filter) -> DbResult<DeleteResult>;

    /// Round-trip to the store to prove the connection is usable.
    async fn ping(&self) -> DbResult<()>;

    async fn close(&self) -> DbResult<()>;
}
