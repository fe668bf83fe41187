//! Document store access for Libris.
//!
//! - [`Database`] is the process-wide handle; it is opened and closed by the
//!   [`DbModule`] during the kernel lifecycle.
//! - [`Collection`] scopes the five single-document operations to one named
//!   collection.
//! - [`Backend`] is the seam between the handle and a concrete store; MongoDB
//!   ([`mongo::MongoBackend`]) and a process-local store
//!   ([`memory::MemoryBackend`]) ship with the crate.

pub mod backend;
pub mod database;
pub mod error;
pub mod filter;
pub mod memory;
pub mod module;
pub mod mongo;

pub use backend::{Backend, DeleteResult, InsertOneResult, UpdateResult};
pub use database::{Collection, Database};
pub use error::{DbError, DbResult};
pub use filter::Filter;
pub use module::DbModule;

/// A stored document: a JSON object keyed by field name.
pub type Document = serde_json::Map<String, serde_json::Value>;

/// Primary key field of every document.
pub const ID_FIELD: &str = "_id";
