//! # SQLite Document Store
//!
//! Durable [`EntityStore`] backed by one `documents` table.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     SQLite Document Store                               │
//! │                                                                         │
//! │  StoreConfig::new(path) ── configure pool settings                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SqliteStore::connect(config).await ── create pool + run migrations     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  documents(collection, id, body)                                        │
//! │       │                                                                 │
//! │       ├── list("products")  → snapshot read                             │
//! │       └── commit(write_set) → BEGIN; op; op; …; COMMIT                  │
//! │                               any failure → ROLLBACK, WriteRejected     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## WAL Mode
//! SQLite WAL (Write-Ahead Logging) mode is enabled so snapshot reads don't
//! block the commit in flight and vice versa.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};
use tracing::{debug, info};

use aushadhi_core::writeset::{Collection, WriteOp, WriteSet};

use crate::error::{StoreError, StoreResult};
use crate::migrations;
use crate::{Document, EntityStore};

// =============================================================================
// Configuration
// =============================================================================

/// Store configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = StoreConfig::new("./data/aushadhi.db")
///     .max_connections(5)
///     .min_connections(1);
/// ```
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Path to the SQLite database file, or ":memory:" for an ephemeral DB.
    pub database_path: PathBuf,

    /// Maximum number of connections in the pool.
    /// Default: 5 (sufficient for a single-counter pharmacy)
    pub max_connections: u32,

    /// Minimum number of connections to keep alive.
    /// Default: 1
    pub min_connections: u32,

    /// Connection timeout duration.
    /// Default: 30 seconds
    pub connect_timeout: Duration,

    /// Whether to run migrations on connect.
    /// Default: true
    pub run_migrations: bool,
}

impl StoreConfig {
    /// Creates a new configuration with the given database path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        StoreConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            run_migrations: true,
        }
    }

    /// Sets the maximum number of connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets the minimum number of connections.
    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Sets whether to run migrations on connect.
    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// Creates an in-memory database configuration (for testing).
    ///
    /// A single connection: each SQLite in-memory connection is its own
    /// database, so pooling more than one would split the data.
    pub fn in_memory() -> Self {
        StoreConfig {
            database_path: PathBuf::from(":memory:"),
            max_connections: 1,
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            run_migrations: true,
        }
    }

    fn is_in_memory(&self) -> bool {
        self.database_path.as_os_str() == ":memory:"
    }
}

// =============================================================================
// Store
// =============================================================================

/// SQLite-backed entity store.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Opens (creating if missing) the database and runs migrations.
    pub async fn connect(config: StoreConfig) -> StoreResult<Self> {
        info!(
            path = %config.database_path.display(),
            "Initializing document store"
        );

        let connect_options = if config.is_in_memory() {
            SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?
        } else {
            let url = format!("sqlite://{}?mode=rwc", config.database_path.display());
            SqliteConnectOptions::from_str(&url)
                .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?
                // WAL mode: snapshot reads and the commit in flight don't
                // block each other
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal)
                .create_if_missing(true)
        };

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .connect_with(connect_options)
            .await
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;

        info!(
            max_connections = config.max_connections,
            "Document store pool created"
        );

        let store = SqliteStore { pool };

        if config.run_migrations {
            migrations::run_migrations(&store.pool).await?;
        }

        Ok(store)
    }

    /// Returns a reference to the connection pool.
    ///
    /// For diagnostics and ad-hoc queries; prefer the trait methods.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Checks if the store is healthy (can execute queries).
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }

    /// Closes the connection pool.
    pub async fn close(&self) {
        info!("Closing document store pool");
        self.pool.close().await;
    }
}

#[async_trait]
impl EntityStore for SqliteStore {
    async fn list(&self, collection: Collection) -> StoreResult<Vec<Document>> {
        let rows = sqlx::query("SELECT id, body FROM documents WHERE collection = ?1 ORDER BY id")
            .bind(collection.as_str())
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(|row| {
                let id: String = row.try_get("id")?;
                let body: String = row.try_get("body")?;
                let body = serde_json::from_str(&body)
                    .map_err(|e| StoreError::Serialization(e.to_string()))?;
                Ok(Document { id, body })
            })
            .collect()
    }

    async fn get(&self, collection: Collection, id: &str) -> StoreResult<Option<Document>> {
        let row = sqlx::query("SELECT body FROM documents WHERE collection = ?1 AND id = ?2")
            .bind(collection.as_str())
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| {
            let body: String = row.try_get("body")?;
            let body = serde_json::from_str(&body)
                .map_err(|e| StoreError::Serialization(e.to_string()))?;
            Ok(Document {
                id: id.to_string(),
                body,
            })
        })
        .transpose()
    }

    async fn commit(&self, write_set: WriteSet) -> StoreResult<()> {
        debug!(ops = write_set.len(), "Committing write set (sqlite)");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::rejected(e.to_string()))?;
        let now = Utc::now().to_rfc3339();

        for op in write_set.ops() {
            match op {
                WriteOp::Create { collection, id, body } => {
                    let body = serde_json::to_string(body)
                        .map_err(|e| StoreError::Serialization(e.to_string()))?;
                    sqlx::query(
                        "INSERT INTO documents (collection, id, body, updated_at) \
                         VALUES (?1, ?2, ?3, ?4)",
                    )
                    .bind(collection.as_str())
                    .bind(id)
                    .bind(body)
                    .bind(&now)
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| {
                        StoreError::rejected(format!("create {collection}/{id}: {e}"))
                    })?;
                }
                WriteOp::Update { collection, id, body } => {
                    let body = serde_json::to_string(body)
                        .map_err(|e| StoreError::Serialization(e.to_string()))?;
                    let result = sqlx::query(
                        "UPDATE documents SET body = ?3, updated_at = ?4 \
                         WHERE collection = ?1 AND id = ?2",
                    )
                    .bind(collection.as_str())
                    .bind(id)
                    .bind(body)
                    .bind(&now)
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| {
                        StoreError::rejected(format!("update {collection}/{id}: {e}"))
                    })?;

                    if result.rows_affected() == 0 {
                        return Err(StoreError::rejected(format!(
                            "update of missing document {collection}/{id}"
                        )));
                    }
                }
                WriteOp::Delete { collection, id } => {
                    let result =
                        sqlx::query("DELETE FROM documents WHERE collection = ?1 AND id = ?2")
                            .bind(collection.as_str())
                            .bind(id)
                            .execute(&mut *tx)
                            .await
                            .map_err(|e| {
                                StoreError::rejected(format!("delete {collection}/{id}: {e}"))
                            })?;

                    if result.rows_affected() == 0 {
                        return Err(StoreError::rejected(format!(
                            "delete of missing document {collection}/{id}"
                        )));
                    }
                }
            }
        }

        tx.commit()
            .await
            .map_err(|e| StoreError::rejected(e.to_string()))?;

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
