//! SQLite connection pool factory and the runtime migration runner.
//!
//! Modules contribute plain SQL scripts through [`libris_kernel::Module::migrations`]
//! and [`libris_kernel::Module::seeds`]. Applied scripts are recorded in the
//! `_migrations` table keyed by module, id, and kind, so reruns are no-ops.

use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use libris_kernel::{settings::DatabaseSettings, Migration};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions},
    ConnectOptions, Executor,
};

const BUSY_TIMEOUT: Duration = Duration::from_secs(30);

/// Distinguishes schema scripts from seed data in the bookkeeping table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptKind {
    Schema,
    Seed,
}

impl ScriptKind {
    fn as_str(self) -> &'static str {
        match self {
            ScriptKind::Schema => "schema",
            ScriptKind::Seed => "seed",
        }
    }
}

/// Open a pool for the connection string selected by `settings.connection_key`.
pub async fn connect(settings: &DatabaseSettings) -> anyhow::Result<SqlitePool> {
    let url = settings.connection_string()?;

    let options = SqliteConnectOptions::from_str(url)
        .with_context(|| format!("invalid database url for key '{}'", settings.connection_key))?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT)
        .disable_statement_logging();

    let pool = SqlitePoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(BUSY_TIMEOUT)
        .connect_with(options)
        .await
        .with_context(|| format!("failed to open database '{}'", settings.connection_key))?;

    tracing::info!(
        target: "libris-db",
        key = %settings.connection_key,
        max_connections = settings.max_connections,
        "database pool ready"
    );

    Ok(pool)
}

/// Private in-memory database, used by tests and the `config` check command.
///
/// Every SQLite in-memory connection is its own database, so the pool is pinned
/// to a single connection that is never recycled.
pub async fn connect_in_memory() -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?
        .foreign_keys(true)
        .disable_statement_logging();

    SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .context("failed to open in-memory database")
}

/// Apply pending schema migrations in the given order. Returns how many ran.
pub async fn run_migrations(
    pool: &SqlitePool,
    migrations: &[(String, Migration)],
) -> anyhow::Result<usize> {
    apply(pool, migrations, ScriptKind::Schema).await
}

/// Apply pending seed scripts. Returns how many ran.
pub async fn run_seeds(pool: &SqlitePool, seeds: &[(String, Migration)]) -> anyhow::Result<usize> {
    apply(pool, seeds, ScriptKind::Seed).await
}

async fn apply(
    pool: &SqlitePool,
    scripts: &[(String, Migration)],
    kind: ScriptKind,
) -> anyhow::Result<usize> {
    create_migrations_table(pool).await?;

    let mut applied = 0;
    for (module, migration) in scripts {
        if is_applied(pool, module, migration.id, kind).await? {
            tracing::debug!(target: "libris-db", %module, id = migration.id, "already applied");
            continue;
        }

        let mut tx = pool.begin().await?;
        (&mut *tx).execute(migration.up).await.with_context(|| {
            format!(
                "{} script '{}' of module '{}' failed",
                kind.as_str(),
                migration.id,
                module
            )
        })?;
        sqlx::query("INSERT INTO _migrations (module, id, kind) VALUES (?, ?, ?)")
            .bind(module)
            .bind(migration.id)
            .bind(kind.as_str())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        tracing::info!(
            target: "libris-db",
            %module,
            id = migration.id,
            kind = kind.as_str(),
            "script applied"
        );
        applied += 1;
    }

    Ok(applied)
}

async fn create_migrations_table(pool: &SqlitePool) -> anyhow::Result<()> {
    pool.execute(
        r#"
        CREATE TABLE IF NOT EXISTS _migrations (
            module TEXT NOT NULL,
            id TEXT NOT NULL,
            kind TEXT NOT NULL,
            applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            PRIMARY KEY (module, id, kind)
        )
        "#,
    )
    .await
    .context("failed to create migrations table")?;

    Ok(())
}

async fn is_applied(
    pool: &SqlitePool,
    module: &str,
    id: &str,
    kind: ScriptKind,
) -> anyhow::Result<bool> {
    let found: Option<String> =
        sqlx::query_scalar("SELECT id FROM _migrations WHERE module = ? AND id = ? AND kind = ?")
            .bind(module)
            .bind(id)
            .bind(kind.as_str())
            .fetch_optional(pool)
            .await?;

    Ok(found.is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scripts() -> Vec<(String, Migration)> {
        vec![(
            "shelf".to_string(),
            Migration {
                id: "001_init",
                up: "CREATE TABLE shelf (id INTEGER PRIMARY KEY, label TEXT NOT NULL);",
            },
        )]
    }

    #[tokio::test]
    async fn migrations_run_once() {
        let pool = connect_in_memory().await.unwrap();

        assert_eq!(run_migrations(&pool, &scripts()).await.unwrap(), 1);
        assert_eq!(run_migrations(&pool, &scripts()).await.unwrap(), 0);

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _migrations")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn seeds_are_tracked_separately_from_schema() {
        let pool = connect_in_memory().await.unwrap();
        run_migrations(&pool, &scripts()).await.unwrap();

        let seeds = vec![(
            "shelf".to_string(),
            Migration {
                id: "001_init",
                up: "INSERT INTO shelf (id, label) VALUES (1, 'top');",
            },
        )];
        assert_eq!(run_seeds(&pool, &seeds).await.unwrap(), 1);
        assert_eq!(run_seeds(&pool, &seeds).await.unwrap(), 0);

        let label: String = sqlx::query_scalar("SELECT label FROM shelf WHERE id = 1")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(label, "top");
    }

    #[tokio::test]
    async fn failing_script_is_not_recorded() {
        let pool = connect_in_memory().await.unwrap();
        let broken = vec![(
            "shelf".to_string(),
            Migration {
                id: "001_broken",
                up: "CREATE TABLE;",
            },
        )];

        let err = run_migrations(&pool, &broken).await.unwrap_err();
        assert!(err.to_string().contains("001_broken"));

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _migrations")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn foreign_keys_are_enforced() {
        let pool = connect_in_memory().await.unwrap();
        pool.execute(
            "CREATE TABLE parent (id INTEGER PRIMARY KEY);
             CREATE TABLE child (id INTEGER PRIMARY KEY, parent_id INTEGER NOT NULL REFERENCES parent(id));",
        )
        .await
        .unwrap();

        let result = sqlx::query("INSERT INTO child (id, parent_id) VALUES (1, 42)")
            .execute(&pool)
            .await;
        assert!(result.is_err());
    }
}
