use axum::http::StatusCode;
use json_patch::{Patch, PatchError, PatchErrorKind};
use libris_http::error::AppError;
use serde_json::Value;

use super::parse_book;
use crate::modules::library::models::BookModel;

/// Apply RFC 6902 `operations` to the JSON form of `model` and re-validate the result.
pub(super) fn apply(model: &BookModel, operations: Value) -> Result<BookModel, AppError> {
    let patch: Patch = serde_json::from_value(operations)
        .map_err(|err| failure(StatusCode::BAD_REQUEST, &err.to_string()))?;

    let mut document = serde_json::to_value(model).map_err(|err| AppError::Internal(err.into()))?;

    json_patch::patch(&mut document, &patch)
        .map_err(|err| failure(suggested_status(&err), &err.to_string()))?;

    if let Some(path) = unknown_member(&document) {
        return Err(failure(
            StatusCode::UNPROCESSABLE_ENTITY,
            &format!("The target location specified by path '{path}' was not found"),
        ));
    }

    parse_book(document)
}

const BOOK_MEMBERS: &[&str] = &["id", "title", "isbn", "author", "publisher"];
const NAMED_MEMBERS: &[&str] = &["id", "name"];

/// Pointer to the first member the book shape has no slot for.
fn unknown_member(document: &Value) -> Option<String> {
    let book = document.as_object()?;

    if let Some(key) = book.keys().find(|key| !BOOK_MEMBERS.contains(&key.as_str())) {
        return Some(format!("/{key}"));
    }

    ["author", "publisher"].into_iter().find_map(|parent| {
        book.get(parent)?
            .as_object()?
            .keys()
            .find(|key| !NAMED_MEMBERS.contains(&key.as_str()))
            .map(|key| format!("/{parent}/{key}"))
    })
}

fn suggested_status(err: &PatchError) -> StatusCode {
    match err.kind {
        PatchErrorKind::TestFailed => StatusCode::CONFLICT,
        PatchErrorKind::InvalidPointer => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::BAD_REQUEST,
    }
}

fn failure(status: StatusCode, detail: &str) -> AppError {
    AppError::bad_request(format!(
        "An error occurred whilst updating book. Status {}. {}.",
        status.as_u16(),
        detail.trim_end_matches('.')
    ))
}
