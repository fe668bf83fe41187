use serde_json::Value;

use crate::{Document, ID_FIELD};

/// Conjunction of field equality clauses. An empty filter matches every
/// document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    clauses: Vec<(String, Value)>,
}

impl Filter {
    /// Filter that matches all documents.
    pub fn all() -> Self {
        Self::default()
    }

    /// Filter on a single field.
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::default().and_eq(field, value)
    }

    /// Filter on the primary key.
    pub fn by_id(id: impl Into<String>) -> Self {
        Self::eq(ID_FIELD, Value::String(id.into()))
    }

    pub fn and_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.clauses.push((field.into(), value.into()));
        self
    }

    pub fn clauses(&self) -> &[(String, Value)] {
        &self.clauses
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Evaluate the filter against a document.
    pub fn matches(&self, document: &Document) -> bool {
        self.clauses
            .iter()
            .all(|(field, expected)| document.get(field) == Some(expected))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn empty_filter_matches_everything() {
        let document = doc(json!({"_id": "a", "title": "Emma"}));
        assert!(Filter::all().matches(&document));
        assert!(Filter::all().is_empty());
    }

    #[test]
    fn by_id_targets_primary_key() {
        let document = doc(json!({"_id": "a", "title": "Emma"}));
        assert!(Filter::by_id("a").matches(&document));
        assert!(!Filter::by_id("b").matches(&document));
    }

    #[test]
    fn clauses_are_conjunctive() {
        let document = doc(json!({"_id": "a", "author": "Austen", "title": "Emma"}));
        let filter = Filter::eq("author", "Austen").and_eq("title", "Persuasion");
        assert!(!filter.matches(&document));

        let filter = Filter::eq("author", "Austen").and_eq("title", "Emma");
        assert!(filter.matches(&document));
    }

    #[test]
    fn missing_field_never_matches() {
        let document = doc(json!({"_id": "a"}));
        assert!(!Filter::eq("title", Value::Null).matches(&document));
    }
}
