//! # Database Migrations
//!
//! Embedded SQL migrations for the SQLite document store.
//!
//! The `sqlx::migrate!()` macro embeds all SQL files from the workspace
//! `migrations/sqlite` directory into the binary at compile time; no
//! runtime file access is needed. Migrations are tracked in the
//! `_sqlx_migrations` table, run in filename order, and each runs in its
//! own transaction — safe to invoke on every startup.
//!
//! ## Adding New Migrations
//! 1. Create a new file in `migrations/sqlite/` with the next sequence
//!    number (`NNN_description.sql`)
//! 2. Write idempotent SQL (use `IF NOT EXISTS` where possible)
//! 3. **NEVER** modify existing migrations - always add new ones

use sqlx::SqlitePool;
use tracing::info;

use crate::error::StoreResult;

/// Embedded migrations from the `migrations/sqlite` directory.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Runs all pending database migrations.
pub async fn run_migrations(pool: &SqlitePool) -> StoreResult<()> {
    info!("Checking for pending migrations");

    MIGRATOR.run(pool).await?;

    info!("All migrations applied successfully");
    Ok(())
}
