use async_trait::async_trait;
use sqlx::{SqliteConnection, SqlitePool};

use super::{BookRepository, RepositoryError, RepositoryResult};
use crate::modules::library::models::{
    Author, Book, BookFilter, BookWrite, EntityState, Publisher,
};

const SELECT_BOOKS: &str = r#"
    SELECT b.id, b.isbn, b.title,
           a.id AS author_id, a.name AS author_name,
           p.id AS publisher_id, p.name AS publisher_name
    FROM books b
    JOIN authors a ON a.id = b.author_id
    JOIN publishers p ON p.id = b.publisher_id
"#;

#[derive(sqlx::FromRow)]
struct BookRow {
    id: i64,
    isbn: String,
    title: String,
    author_id: i64,
    author_name: String,
    publisher_id: i64,
    publisher_name: String,
}

impl From<BookRow> for Book {
    fn from(row: BookRow) -> Self {
        Book {
            id: row.id,
            isbn: row.isbn,
            title: row.title,
            author: Author {
                id: row.author_id,
                name: row.author_name,
            },
            publisher: Publisher {
                id: row.publisher_id,
                name: row.publisher_name,
            },
        }
    }
}

/// [`BookRepository`] backed by the SQLite schema from the library migrations.
#[derive(Debug, Clone)]
pub struct SqliteBookRepository {
    pool: SqlitePool,
}

impl SqliteBookRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookRepository for SqliteBookRepository {
    async fn get_all(&self) -> RepositoryResult<Vec<Book>> {
        let mut conn = self.pool.acquire().await?;
        let rows = sqlx::query_as::<_, BookRow>(&format!("{SELECT_BOOKS} ORDER BY b.id"))
            .fetch_all(&mut *conn)
            .await?;

        Ok(rows.into_iter().map(Book::from).collect())
    }

    async fn query(&self, filter: BookFilter) -> RepositoryResult<Vec<Book>> {
        let mut conn = self.pool.acquire().await?;
        let rows = match filter {
            BookFilter::AuthorName(name) => {
                sqlx::query_as::<_, BookRow>(&format!(
                    "{SELECT_BOOKS} WHERE a.name = ? ORDER BY b.id"
                ))
                .bind(name)
                .fetch_all(&mut *conn)
                .await?
            }
        };

        Ok(rows.into_iter().map(Book::from).collect())
    }

    async fn get_by_id(&self, id: i64) -> RepositoryResult<Option<Book>> {
        let mut conn = self.pool.acquire().await?;
        let row = sqlx::query_as::<_, BookRow>(&format!("{SELECT_BOOKS} WHERE b.id = ?"))
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

        Ok(row.map(Book::from))
    }

    async fn insert_or_update(&self, write: BookWrite) -> RepositoryResult<()> {
        let BookWrite {
            book,
            state,
            author_state,
            publisher_state,
        } = write;

        let mut tx = self.pool.begin().await?;

        let author_id = save_named(
            &mut tx,
            NamedTable::Authors,
            book.author.id,
            &book.author.name,
            author_state,
        )
        .await?;
        let publisher_id = save_named(
            &mut tx,
            NamedTable::Publishers,
            book.publisher.id,
            &book.publisher.name,
            publisher_state,
        )
        .await?;

        match state {
            EntityState::Added => {
                let id = sqlx::query(
                    "INSERT INTO books (isbn, title, author_id, publisher_id) VALUES (?, ?, ?, ?)",
                )
                .bind(&book.isbn)
                .bind(&book.title)
                .bind(author_id)
                .bind(publisher_id)
                .execute(&mut *tx)
                .await?
                .last_insert_rowid();
                tracing::debug!(book_id = id, "book inserted");
            }
            EntityState::Modified => {
                let result = sqlx::query(
                    "UPDATE books SET isbn = ?, title = ?, author_id = ?, publisher_id = ? WHERE id = ?",
                )
                .bind(&book.isbn)
                .bind(&book.title)
                .bind(author_id)
                .bind(publisher_id)
                .bind(book.id)
                .execute(&mut *tx)
                .await?;
                if result.rows_affected() == 0 {
                    return Err(RepositoryError::Missing {
                        entity: "book",
                        id: book.id,
                    });
                }
                tracing::debug!(book_id = book.id, "book updated");
            }
            EntityState::Deleted => {
                sqlx::query("DELETE FROM books WHERE id = ?")
                    .bind(book.id)
                    .execute(&mut *tx)
                    .await?;
                tracing::debug!(book_id = book.id, "book deleted");
            }
            EntityState::Unchanged => {}
        }

        tx.commit().await?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> RepositoryResult<()> {
        let mut conn = self.pool.acquire().await?;
        let result = sqlx::query("DELETE FROM books WHERE id = ?")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        if result.rows_affected() == 0 {
            tracing::debug!(book_id = id, "delete skipped, book does not exist");
        }
        Ok(())
    }
}

#[derive(Clone, Copy)]
enum NamedTable {
    Authors,
    Publishers,
}

impl NamedTable {
    fn entity(self) -> &'static str {
        match self {
            NamedTable::Authors => "author",
            NamedTable::Publishers => "publisher",
        }
    }
}

/// Write an author or publisher row according to `state`; returns the id the book should reference.
async fn save_named(
    conn: &mut SqliteConnection,
    table: NamedTable,
    id: i64,
    name: &str,
    state: EntityState,
) -> RepositoryResult<i64> {
    let (insert, update) = match table {
        NamedTable::Authors => (
            "INSERT INTO authors (name) VALUES (?)",
            "UPDATE authors SET name = ? WHERE id = ?",
        ),
        NamedTable::Publishers => (
            "INSERT INTO publishers (name) VALUES (?)",
            "UPDATE publishers SET name = ? WHERE id = ?",
        ),
    };

    match state {
        EntityState::Added => {
            let result = sqlx::query(insert).bind(name).execute(&mut *conn).await?;
            Ok(result.last_insert_rowid())
        }
        EntityState::Modified => {
            let result = sqlx::query(update)
                .bind(name)
                .bind(id)
                .execute(&mut *conn)
                .await?;
            if result.rows_affected() == 0 {
                return Err(RepositoryError::Missing {
                    entity: table.entity(),
                    id,
                });
            }
            Ok(id)
        }
        // Deleting a book never cascades to the entities it references.
        EntityState::Unchanged | EntityState::Deleted => Ok(id),
    }
}
