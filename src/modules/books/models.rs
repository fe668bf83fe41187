use libris_db::{Document, ID_FIELD};
use libris_http::extract::{require_non_empty, FieldViolation, Validate};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Collection holding book documents.
pub const COLLECTION: &str = "books";

/// A book as stored and as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    /// Unique identifier for the book; stored as the document's `_id`
    #[serde(alias = "_id")]
    pub id: String,
    pub title: String,
    pub author: String,
    pub synopsis: String,
}

impl Book {
    /// Storage representation, keyed by `_id`.
    pub fn into_document(self) -> Document {
        let mut document = Document::new();
        document.insert(ID_FIELD.to_string(), Value::String(self.id));
        document.insert("title".to_string(), Value::String(self.title));
        document.insert("author".to_string(), Value::String(self.author));
        document.insert("synopsis".to_string(), Value::String(self.synopsis));
        document
    }

    pub fn from_document(document: Document) -> Result<Self, serde_json::Error> {
        serde_json::from_value(Value::Object(document))
    }
}

/// Request model for creating a new book.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBook {
    /// Client-chosen identifier; a random UUID is generated when absent
    #[serde(default, alias = "_id")]
    pub id: Option<String>,
    pub title: String,
    pub author: String,
    pub synopsis: String,
}

impl CreateBook {
    pub fn into_book(self) -> Book {
        Book {
            id: self.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            title: self.title,
            author: self.author,
            synopsis: self.synopsis,
        }
    }
}

impl Validate for CreateBook {
    fn violations(&self) -> Vec<FieldViolation> {
        let mut violations = Vec::new();
        if let Some(id) = &self.id {
            require_non_empty("id", id, &mut violations);
        }
        require_non_empty("title", &self.title, &mut violations);
        require_non_empty("author", &self.author, &mut violations);
        require_non_empty("synopsis", &self.synopsis, &mut violations);
        violations
    }
}

/// Partial update of a book. Absent or `null` fields are left untouched;
/// the identifier cannot be patched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BookPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synopsis: Option<String>,
}

impl BookPatch {
    /// Fields to merge into the stored document: only the provided ones.
    pub fn into_field_set(self) -> Document {
        [
            ("title", self.title),
            ("author", self.author),
            ("synopsis", self.synopsis),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.map(|v| (field.to_string(), Value::String(v))))
        .collect()
    }
}

impl Validate for BookPatch {
    fn violations(&self) -> Vec<FieldViolation> {
        let mut violations = Vec::new();
        for (field, value) in [
            ("title", &self.title),
            ("author", &self.author),
            ("synopsis", &self.synopsis),
        ] {
            if let Some(value) = value {
                require_non_empty(field, value, &mut violations);
            }
        }
        violations
    }
}
