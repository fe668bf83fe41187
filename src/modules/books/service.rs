use libris_db::{Collection, Database, DbError, Filter};
use libris_http::AppError;
use thiserror::Error;

use super::models::{Book, BookPatch, CreateBook, COLLECTION};

/// Upper bound on the number of books returned by a listing.
pub const LIST_LIMIT: u64 = 100;

#[derive(Debug, Error)]
pub enum BookError {
    #[error("Book with ID {id} not found")]
    NotFound { id: String },

    #[error("book {id} could not be read back after insert")]
    NotPersisted { id: String },

    #[error("stored book document is malformed: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error(transparent)]
    Persistence(#[from] DbError),
}

impl BookError {
    fn not_found(id: &str) -> Self {
        Self::NotFound { id: id.to_string() }
    }
}

impl From<BookError> for AppError {
    fn from(err: BookError) -> Self {
        match err {
            BookError::NotFound { .. } => AppError::not_found(err.to_string()),
            other => AppError::Internal(anyhow::Error::new(other)),
        }
    }
}

/// The five book operations over the `books` collection.
#[derive(Clone)]
pub struct BookService {
    books: Collection,
}

impl BookService {
    pub fn new(database: &Database) -> Self {
        Self {
            books: database.collection(COLLECTION),
        }
    }

    pub fn collection_name(&self) -> &str {
        self.books.name()
    }

    /// Insert a new book and return it as stored.
    pub async fn create(&self, input: CreateBook) -> Result<Book, BookError> {
        let book = input.into_book();
        let id = book.id.clone();

        self.books.insert_one(book.into_document()).await?;
        tracing::debug!(book_id = %id, "book created");

        self.find(&id)
            .await?
            .ok_or(BookError::NotPersisted { id })
    }

    /// At most [`LIST_LIMIT`] books in store order.
    pub async fn list(&self) -> Result<Vec<Book>, BookError> {
        let documents = self.books.find(&Filter::all(), Some(LIST_LIMIT)).await?;
        documents
            .into_iter()
            .map(|document| Book::from_document(document).map_err(BookError::from))
            .collect()
    }

    pub async fn get(&self, id: &str) -> Result<Book, BookError> {
        self.find(id).await?.ok_or_else(|| BookError::not_found(id))
    }

    /// Merge the provided fields into the book and return its current state.
    ///
    /// An empty patch only reads the book back. Existence is decided by the
    /// matched count, so a patch that changes nothing still succeeds.
    pub async fn update(&self, id: &str, patch: BookPatch) -> Result<Book, BookError> {
        let fields = patch.into_field_set();

        if !fields.is_empty() {
            let result = self.books.update_one(&Filter::by_id(id), fields).await?;
            if result.matched_count == 0 {
                return Err(BookError::not_found(id));
            }
            tracing::debug!(
                book_id = %id,
                modified = result.modified_count,
                "book updated"
            );
        }

        self.get(id).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), BookError> {
        let result = self.books.delete_one(&Filter::by_id(id)).await?;
        if result.deleted_count == 1 {
            tracing::debug!(book_id = %id, "book deleted");
            Ok(())
        } else {
            Err(BookError::not_found(id))
        }
    }

    async fn find(&self, id: &str) -> Result<Option<Book>, BookError> {
        let document = self.books.find_one(&Filter::by_id(id)).await?;
        Ok(document.map(Book::from_document).transpose()?)
    }
}
