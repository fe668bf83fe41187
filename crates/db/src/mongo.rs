//! MongoDB backend built on the official driver.

use async_trait::async_trait;
use mongodb::{
    bson::{self, doc, Bson},
    error::{ErrorKind, WriteFailure},
    Client,
};
use serde_json::Value;

use crate::backend::{Backend, DeleteResult, InsertOneResult, UpdateResult};
use crate::{DbError, DbResult, Document, Filter, ID_FIELD};

const DUPLICATE_KEY_CODE: i32 = 11000;

pub struct MongoBackend {
    client: Client,
    database: mongodb::Database,
}

impl MongoBackend {
    /// Build a client for `uri` scoped to database `name`.
    ///
    /// The driver connects lazily; call [`Backend::ping`] to fail fast.
    pub async fn connect(uri: &str, name: &str) -> DbResult<Self> {
        let client = Client::with_uri_str(uri).await?;
        let database = client.database(name);
        Ok(Self { client, database })
    }

    fn collection(&self, name: &str) -> mongodb::Collection<bson::Document> {
        self.database.collection(name)
    }
}

#[async_trait]
impl Backend for MongoBackend {
    fn kind(&self) -> &'static str {
        "mongo"
    }

    async fn insert_one(&self, collection: &str, document: Document) -> DbResult<InsertOneResult> {
        let key = document.get(ID_FIELD).cloned();
        let document = to_bson_document(&document)?;

        let result = self
            .collection(collection)
            .insert_one(document)
            .await
            .map_err(|err| {
                if is_duplicate_key(&err) {
                    DbError::DuplicateKey {
                        collection: collection.to_string(),
                        key: match key {
                            Some(Value::String(key)) => key,
                            Some(other) => other.to_string(),
                            None => String::new(),
                        },
                    }
                } else {
                    DbError::Driver(err)
                }
            })?;

        Ok(InsertOneResult {
            inserted_id: result.inserted_id.into_relaxed_extjson(),
        })
    }

    async fn find_one(&self, collection: &str, filter: &Filter) -> DbResult<Option<Document>> {
        let found = self
            .collection(collection)
            .find_one(filter_document(filter)?)
            .await?;
        found.map(from_bson_document).transpose()
    }

    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        limit: Option<u64>,
    ) -> DbResult<Vec<Document>> {
        let mut query = self.collection(collection).find(filter_document(filter)?);
        if let Some(limit) = limit {
            query = query.limit(i64::try_from(limit).unwrap_or(i64::MAX));
        }

        let mut cursor = query.await?;
        let mut documents = Vec::new();
        while cursor.advance().await? {
            documents.push(from_bson_document(cursor.deserialize_current()?)?);
        }
        Ok(documents)
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        fields: Document,
    ) -> DbResult<UpdateResult> {
        let update = doc! { "$set": to_bson_document(&fields)? };
        let result = self
            .collection(collection)
            .update_one(filter_document(filter)?, update)
            .await?;

        Ok(UpdateResult {
            matched_count: result.matched_count,
            modified_count: result.modified_count,
        })
    }

    async fn delete_one(&self, collection: &str, filter: &Filter) -> DbResult<DeleteResult> {
        let result = self
            .collection(collection)
            .delete_one(filter_document(filter)?)
            .await?;

        Ok(DeleteResult {
            deleted_count: result.deleted_count,
        })
    }

    async fn ping(&self) -> DbResult<()> {
        self.database.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }

    async fn close(&self) -> DbResult<()> {
        self.client.clone().shutdown().await;
        Ok(())
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => {
            write_error.code == DUPLICATE_KEY_CODE
        }
        _ => false,
    }
}

pub(crate) fn to_bson_document(document: &Document) -> DbResult<bson::Document> {
    bson::to_document(document).map_err(|err| DbError::Encoding(err.to_string()))
}

pub(crate) fn from_bson_document(document: bson::Document) -> DbResult<Document> {
    match Bson::Document(document).into_relaxed_extjson() {
        Value::Object(map) => Ok(map),
        other => Err(DbError::Encoding(format!(
            "expected a document, found {}",
            other
        ))),
    }
}

pub(crate) fn filter_document(filter: &Filter) -> DbResult<bson::Document> {
    let mut document = bson::Document::new();
    for (field, value) in filter.clauses() {
        let value = bson::to_bson(value).map_err(|err| DbError::Encoding(err.to_string()))?;
        document.insert(field.clone(), value);
    }
    Ok(document)
}
