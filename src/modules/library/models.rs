use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// Identity of an entity that has not been persisted yet.
pub const UNASSIGNED_ID: i64 = 0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Publisher {
    pub id: i64,
    pub name: String,
}

/// A book always owns exactly one author and one publisher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub id: i64,
    pub isbn: String,
    pub title: String,
    pub author: Author,
    pub publisher: Publisher,
}

/// What a write should do with an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityState {
    Unchanged,
    Added,
    Modified,
    Deleted,
}

impl EntityState {
    /// `Added` for entities without an identity, `Modified` otherwise.
    pub fn from_id(id: Option<i64>) -> Self {
        match id {
            None => EntityState::Added,
            Some(_) => EntityState::Modified,
        }
    }
}

/// A book plus the operation to apply to it and to each related entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookWrite {
    pub book: Book,
    pub state: EntityState,
    pub author_state: EntityState,
    pub publisher_state: EntityState,
}

/// Filters understood by [`super::repository::BookRepository::query`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookFilter {
    /// Exact, case-sensitive match on the author's name
    AuthorName(String),
}

// ---------------------------------------------------------------------------
// Transfer objects
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorModel {
    pub id: Option<i64>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublisherModel {
    pub id: Option<i64>,
    pub name: String,
}

/// External representation of a book; `id` is `null` until the book is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookModel {
    pub id: Option<i64>,
    pub title: String,
    pub isbn: String,
    pub author: AuthorModel,
    pub publisher: PublisherModel,
}

/// One failing field, serialized as `{"field": ..., "error": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub error: &'static str,
}

impl FieldError {
    fn new(field: impl Into<String>, error: &'static str) -> Self {
        Self {
            field: field.into(),
            error,
        }
    }
}

impl BookModel {
    /// Check required fields on a raw JSON body before it is deserialized.
    ///
    /// Reports every failing field instead of stopping at the first one.
    pub fn validate(value: &Value) -> Vec<FieldError> {
        let Some(book) = value.as_object() else {
            return vec![FieldError::new("$", "must be an object")];
        };

        let mut errors = Vec::new();

        match book.get("id") {
            None | Some(Value::Null) => {}
            Some(id) if id.is_i64() => {}
            Some(_) => errors.push(FieldError::new("id", "must be an integer or null")),
        }

        require_text(book.get("title"), "title", &mut errors);
        require_text(book.get("isbn"), "isbn", &mut errors);
        require_named(book.get("author"), "author", &mut errors);
        require_named(book.get("publisher"), "publisher", &mut errors);

        errors
    }
}

fn require_text(value: Option<&Value>, field: &str, errors: &mut Vec<FieldError>) {
    match value {
        None | Some(Value::Null) => errors.push(FieldError::new(field, "required")),
        Some(Value::String(text)) if text.trim().is_empty() => {
            errors.push(FieldError::new(field, "required"))
        }
        Some(Value::String(_)) => {}
        Some(_) => errors.push(FieldError::new(field, "must be a string")),
    }
}

/// Nested `{id, name}` objects shared by authors and publishers.
fn require_named(value: Option<&Value>, field: &str, errors: &mut Vec<FieldError>) {
    match value {
        None | Some(Value::Null) => errors.push(FieldError::new(field, "required")),
        Some(Value::Object(object)) => {
            match object.get("id") {
                None | Some(Value::Null) => {}
                Some(id) if id.is_i64() => {}
                Some(_) => errors.push(FieldError::new(
                    format!("{field}.id"),
                    "must be an integer or null",
                )),
            }
            require_text(object.get("name"), &format!("{field}.name"), errors);
        }
        Some(_) => errors.push(FieldError::new(field, "must be an object")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(errors: &[FieldError]) -> Vec<&str> {
        errors.iter().map(|e| e.field.as_str()).collect()
    }

    #[test]
    fn complete_book_passes() {
        let body = json!({
            "title": "Red",
            "isbn": "22222",
            "author": { "name": "Cathy Dunne" },
            "publisher": { "id": 2, "name": "Microsoft Press" }
        });
        assert!(BookModel::validate(&body).is_empty());
    }

    #[test]
    fn every_missing_field_is_reported() {
        let errors = BookModel::validate(&json!({}));
        assert_eq!(fields(&errors), vec!["title", "isbn", "author", "publisher"]);
        assert!(errors.iter().all(|e| e.error == "required"));
    }

    #[test]
    fn blank_and_nested_fields_are_reported() {
        let body = json!({
            "id": null,
            "title": "   ",
            "isbn": "33333",
            "author": {},
            "publisher": { "name": "" }
        });
        let errors = BookModel::validate(&body);
        assert_eq!(fields(&errors), vec!["title", "author.name", "publisher.name"]);
    }

    #[test]
    fn wrong_types_are_reported() {
        let body = json!({
            "id": "seven",
            "title": 7,
            "isbn": "1",
            "author": "Amy Brown",
            "publisher": { "id": 1.5, "name": "Apress" }
        });
        let errors = BookModel::validate(&body);
        assert_eq!(fields(&errors), vec!["id", "title", "author", "publisher.id"]);
    }

    #[test]
    fn non_object_body_is_rejected() {
        let errors = BookModel::validate(&json!([1, 2]));
        assert_eq!(
            serde_json::to_value(&errors[0]).unwrap(),
            json!({"field": "$", "error": "must be an object"})
        );
    }

    #[test]
    fn dto_serializes_with_null_id() {
        let model = BookModel {
            id: None,
            title: "Blue".into(),
            isbn: "44444".into(),
            author: AuthorModel {
                id: Some(2),
                name: "Cathy Dunne".into(),
            },
            publisher: PublisherModel {
                id: Some(2),
                name: "Microsoft Press".into(),
            },
        };
        let value = serde_json::to_value(&model).unwrap();
        assert_eq!(value["id"], Value::Null);
        assert_eq!(value["author"]["name"], "Cathy Dunne");
    }

    #[test]
    fn state_follows_identity() {
        assert_eq!(EntityState::from_id(None), EntityState::Added);
        assert_eq!(EntityState::from_id(Some(3)), EntityState::Modified);
    }
}
