mod sqlite;

pub use sqlite::SqliteBookRepository;

use async_trait::async_trait;

use super::models::{Book, BookFilter, BookWrite};

#[derive(thiserror::Error, Debug)]
pub enum RepositoryError {
    #[error("database failure: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{entity} {id} does not exist")]
    Missing { entity: &'static str, id: i64 },
}

impl From<RepositoryError> for libris_http::error::AppError {
    fn from(err: RepositoryError) -> Self {
        libris_http::error::AppError::Internal(err.into())
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Data access for books. Every call runs on its own connection and keeps no state afterwards.
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// All books with author and publisher populated
    async fn get_all(&self) -> RepositoryResult<Vec<Book>>;

    /// Books matching `filter`, loaded like [`BookRepository::get_all`]
    async fn query(&self, filter: BookFilter) -> RepositoryResult<Vec<Book>>;

    /// `None` when no book has this id
    async fn get_by_id(&self, id: i64) -> RepositoryResult<Option<Book>>;

    /// Apply the write's author, publisher, and book operations in one transaction
    async fn insert_or_update(&self, write: BookWrite) -> RepositoryResult<()>;

    /// Remove the book; a missing id is not an error
    async fn delete(&self, id: i64) -> RepositoryResult<()>;
}
