mod patch;

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use libris_http::error::AppError;
use serde_json::Value;

use super::models::{BookFilter, BookModel};
use super::repository::BookRepository;
use crate::utils;

pub type SharedRepository = Arc<dyn BookRepository>;

/// Book endpoints, relative to the module mount point.
pub fn router(repository: SharedRepository) -> Router {
    let prefix = utils::log_prefix("library");
    tracing::debug!(target: "libris.routes", %prefix, "registering library routes");

    Router::new()
        .route("/health", get(health_check))
        .route("/books", get(list_books).post(create_book))
        .route(
            "/books/{id}",
            get(get_book).patch(patch_book).delete(delete_book),
        )
        .route("/authors/{author}/books", get(list_books_by_author))
        .with_state(repository)
}

async fn health_check() -> &'static str {
    "library module is healthy"
}

async fn list_books(
    State(repository): State<SharedRepository>,
) -> Result<Json<Vec<BookModel>>, AppError> {
    let books = repository.get_all().await?;
    Ok(Json(books.iter().map(BookModel::from).collect()))
}

async fn get_book(
    State(repository): State<SharedRepository>,
    Path(id): Path<String>,
) -> Result<Json<BookModel>, AppError> {
    let id = book_id(&id)?;
    let book = repository
        .get_by_id(id)
        .await?
        .ok_or_else(|| book_not_found(id))?;

    Ok(Json(BookModel::from(&book)))
}

/// An empty list is a valid answer here, never a 404.
async fn list_books_by_author(
    State(repository): State<SharedRepository>,
    Path(author): Path<String>,
) -> Result<Json<Vec<BookModel>>, AppError> {
    if !utils::is_full_name(&author) {
        return Err(AppError::not_found(format!("no route for author '{author}'")));
    }

    let books = repository.query(BookFilter::AuthorName(author)).await?;
    Ok(Json(books.iter().map(BookModel::from).collect()))
}

async fn create_book(
    State(repository): State<SharedRepository>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let book = parse_book(json_body(body)?)?;

    if book.id.is_some() {
        return Err(AppError::bad_request(
            "Cannot add book as it already has an id.",
        ));
    }

    repository.insert_or_update(book.to_entity()).await?;

    tracing::info!(title = %book.title, isbn = %book.isbn, "book created");
    Ok(StatusCode::CREATED)
}

async fn patch_book(
    State(repository): State<SharedRepository>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<BookModel>, AppError> {
    let id = book_id(&id)?;
    let book = repository
        .get_by_id(id)
        .await?
        .ok_or_else(|| book_not_found(id))?;

    let operations = json_body(body)?;
    let mut patched = patch::apply(&BookModel::from(&book), operations)?;
    // The route id picks the row, whatever the operations did to `/id`.
    patched.id = Some(id);

    repository.insert_or_update(patched.to_entity()).await?;

    tracing::info!(book_id = id, "book patched");
    Ok(Json(patched))
}

async fn delete_book(
    State(repository): State<SharedRepository>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = book_id(&id)?;
    if repository.get_by_id(id).await?.is_none() {
        return Err(book_not_found(id));
    }

    repository.delete(id).await?;

    tracing::info!(book_id = id, "book deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Validate a raw body against the required-field rules, then deserialize it.
pub(crate) fn parse_book(value: Value) -> Result<BookModel, AppError> {
    let errors = BookModel::validate(&value);
    if !errors.is_empty() {
        let details = errors
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| AppError::Internal(err.into()))?;
        return Err(AppError::validation(details, "book failed validation"));
    }

    serde_json::from_value(value).map_err(|err| AppError::bad_request(err.to_string()))
}

fn json_body(body: Result<Json<Value>, JsonRejection>) -> Result<Value, AppError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| AppError::bad_request(rejection.body_text()))
}

/// Non-integer ids do not match the book routes at all.
fn book_id(raw: &str) -> Result<i64, AppError> {
    raw.parse()
        .map_err(|_| AppError::not_found(format!("no route for book id '{raw}'")))
}

fn book_not_found(id: i64) -> AppError {
    AppError::not_found(format!("book {id} not found"))
}
