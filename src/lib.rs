//! LIBRIS Application Library
//!
//! Wires the `library` module to its SQLite repository and drives the module
//! lifecycle shared by the server binary and the CLI.

pub mod modules;
pub mod utils;

use std::sync::Arc;

use anyhow::Context;
use libris_kernel::{settings::Settings, InitCtx, ModuleRegistry};
use sqlx::SqlitePool;

use modules::library::repository::SqliteBookRepository;

/// Registered modules together with the pool backing them.
pub struct App {
    pub registry: ModuleRegistry,
    pub pool: SqlitePool,
}

impl App {
    /// Open the configured database and register every module against it.
    pub async fn build(settings: &Settings) -> anyhow::Result<Self> {
        let pool = libris_db::connect(&settings.database)
            .await
            .context("failed to connect to the books database")?;
        Ok(Self::with_pool(pool))
    }

    pub fn with_pool(pool: SqlitePool) -> Self {
        let mut registry = ModuleRegistry::new();
        modules::register_all(
            &mut registry,
            Arc::new(SqliteBookRepository::new(pool.clone())),
        );
        Self { registry, pool }
    }

    /// Apply pending schema migrations, then seed data when `seed` is set.
    pub async fn migrate(&self, seed: bool) -> anyhow::Result<()> {
        let applied = libris_db::run_migrations(&self.pool, &self.registry.collect_migrations())
            .await
            .context("schema migration failed")?;
        tracing::info!(applied, "schema migrations complete");

        if seed {
            let seeded = libris_db::run_seeds(&self.pool, &self.registry.collect_seeds())
                .await
                .context("seeding failed")?;
            tracing::info!(seeded, "seed data applied");
        }

        Ok(())
    }

    /// Run the full lifecycle: init, migrate, start, serve until shutdown, stop.
    pub async fn serve(&self, settings: &Settings) -> anyhow::Result<()> {
        let ctx = InitCtx { settings };

        self.registry.init_all(&ctx).await?;
        self.migrate(settings.database.seed).await?;
        self.registry.start_all(&ctx).await?;

        let served = libris_http::start_server(&self.registry, settings).await;

        self.registry.stop_all().await?;
        self.pool.close().await;

        served
    }
}
