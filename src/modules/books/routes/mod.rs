//! HTTP handlers for the book module.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use libris_http::{AppError, ValidatedJson};

use super::models::{Book, BookPatch, CreateBook};
use super::service::BookService;

/// Routes relative to the module mount point.
pub fn router(service: BookService) -> Router {
    Router::new()
        .route("/", post(create_book).get(list_books))
        .route("/{id}", get(find_book).put(update_book).delete(delete_book))
        .with_state(service)
}

async fn create_book(
    State(service): State<BookService>,
    ValidatedJson(input): ValidatedJson<CreateBook>,
) -> Result<(StatusCode, Json<Book>), AppError> {
    let book = service.create(input).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

async fn list_books(State(service): State<BookService>) -> Result<Json<Vec<Book>>, AppError> {
    Ok(Json(service.list().await?))
}

async fn find_book(
    State(service): State<BookService>,
    Path(id): Path<String>,
) -> Result<Json<Book>, AppError> {
    Ok(Json(service.get(&id).await?))
}

async fn update_book(
    State(service): State<BookService>,
    Path(id): Path<String>,
    ValidatedJson(patch): ValidatedJson<BookPatch>,
) -> Result<Json<Book>, AppError> {
    Ok(Json(service.update(&id, patch).await?))
}

async fn delete_book(
    State(service): State<BookService>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    service.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
