use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::orders::OrderError;

/// How to treat a store file that does not exist yet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// Refuse to serve; a missing store is fatal
    ExistingOnly,
    /// Create the file (used by `init`)
    CreateIfMissing,
}

/// Database manager for the shared order store
#[derive(Debug, Clone)]
pub struct DatabaseManager {
    pool: SqlitePool,
}

impl DatabaseManager {
    /// Open the store with WAL journaling and a bounded busy timeout,
    /// applying migrations when configured.
    pub async fn open(config: &DatabaseConfig, mode: OpenMode) -> Result<Self, OrderError> {
        let options = connect_options(&config.path)?
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(config.busy_timeout())
            .create_if_missing(mode == OpenMode::CreateIfMissing);

        let location = options.get_filename().to_path_buf();
        if mode == OpenMode::ExistingOnly && !is_in_memory(&location) && !location.exists() {
            return Err(OrderError::StoreUnavailable(format!(
                "database not found at {}",
                location.display()
            )));
        }

        if mode == OpenMode::CreateIfMissing {
            info!("Opening or creating database at {}", location.display());
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections.max(1))
            .acquire_timeout(config.busy_timeout())
            .connect_with(options)
            .await
            .map_err(|e| match OrderError::from(e) {
                OrderError::Store(inner) => OrderError::StoreUnavailable(inner.to_string()),
                other => other,
            })?;

        if config.auto_migrate || mode == OpenMode::CreateIfMissing {
            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .map_err(|e| OrderError::StoreUnavailable(format!("migration failed: {e}")))?;
        }

        info!("Database ready at {}", location.display());
        Ok(Self { pool })
    }

    /// Get database pool for queries
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close database connections gracefully
    pub async fn shutdown(&self) {
        info!("Shutting down database connections...");
        self.pool.close().await;
        info!("Database connections closed");
    }
}

fn connect_options(path: &str) -> Result<SqliteConnectOptions, OrderError> {
    if path.starts_with("sqlite:") {
        SqliteConnectOptions::from_str(path).map_err(|e| {
            OrderError::StoreUnavailable(format!("invalid connection string '{path}': {e}"))
        })
    } else {
        Ok(SqliteConnectOptions::new().filename(path))
    }
}

fn is_in_memory(location: &Path) -> bool {
    location.as_os_str() == ":memory:"
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_at(path: &Path) -> DatabaseConfig {
        DatabaseConfig {
            path: path.to_string_lossy().into_owned(),
            busy_timeout_ms: 1_000,
            max_connections: 2,
            auto_migrate: true,
        }
    }

    #[tokio::test]
    async fn test_missing_store_is_unavailable() {
        let temp_dir = TempDir::new().unwrap();
        let config = config_at(&temp_dir.path().join("absent.db"));

        let err = DatabaseManager::open(&config, OpenMode::ExistingOnly)
            .await
            .unwrap_err();
        assert!(err.is_fatal());
        assert!(!temp_dir.path().join("absent.db").exists());
    }

    #[tokio::test]
    async fn test_create_then_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("yard.db");
        let config = config_at(&path);

        let created = DatabaseManager::open(&config, OpenMode::CreateIfMissing)
            .await
            .unwrap();
        created.shutdown().await;
        assert!(path.exists());

        let reopened = DatabaseManager::open(&config, OpenMode::ExistingOnly)
            .await
            .unwrap();
        let mode: String = sqlx::query_scalar("PRAGMA journal_mode")
            .fetch_one(reopened.pool())
            .await
            .unwrap();
        assert_eq!(mode.to_lowercase(), "wal");

        let tables: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'orders'",
        )
        .fetch_one(reopened.pool())
        .await
        .unwrap();
        assert_eq!(tables, 1);
    }
}
