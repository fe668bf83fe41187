use thiserror::Error;

pub type DbResult<T> = Result<T, DbError>;

/// Failures surfaced by the document store layer.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("database is not connected")]
    NotConnected,

    #[error("duplicate key '{key}' in collection '{collection}'")]
    DuplicateKey { collection: String, key: String },

    #[error("document inserted into '{collection}' has no '_id'")]
    MissingId { collection: String },

    #[error("field '{field}' is immutable")]
    ImmutableField { field: String },

    #[error("document encoding failed: {0}")]
    Encoding(String),

    #[error(transparent)]
    Driver(#[from] mongodb::error::Error),
}
