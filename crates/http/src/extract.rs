//! Request body extraction with boundary validation.

use axum::{
    extract::{FromRequest, Request},
    Json,
};
use serde::{de::DeserializeOwned, Serialize};

use crate::error::AppError;

/// One rejected field of a request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: &'static str,
    pub error: String,
}

impl FieldViolation {
    pub fn new(field: &'static str, error: impl Into<String>) -> Self {
        Self {
            field,
            error: error.into(),
        }
    }
}

/// Semantic checks run after a body deserialized successfully.
pub trait Validate {
    fn violations(&self) -> Vec<FieldViolation>;
}

/// Record a violation when a string field is empty. Whitespace counts as
/// content.
pub fn require_non_empty(
    field: &'static str,
    value: &str,
    violations: &mut Vec<FieldViolation>,
) {
    if value.is_empty() {
        violations.push(FieldViolation::new(field, "must not be empty"));
    }
}

/// JSON body that has been deserialized and validated. Any failure is
/// rejected with [`AppError::Validation`] before the handler runs.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                AppError::validation(
                    vec![serde_json::json!({ "error": rejection.body_text() })],
                    "request body could not be parsed",
                )
            })?;

        let violations = value.violations();
        if !violations.is_empty() {
            let details = violations
                .iter()
                .map(|violation| serde_json::json!(violation))
                .collect();
            return Err(AppError::validation(details, "request body failed validation"));
        }

        Ok(Self(value))
    }
}
