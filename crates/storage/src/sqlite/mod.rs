use std::sync::Arc;
use std::time::Duration;

use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
use thiserror::Error;
use tokio::sync::Mutex;

use crate::repository::{ProgressRepository, Storage};

mod migrate;
mod progress_repo;

/// What this handle last saw in the store: attempts and registration clicks.
///
/// A save only writes the difference between the ledger and this mark, and is
/// refused if another writer moved the store's attempts past it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SyncMark {
    pub(crate) attempts: u64,
    pub(crate) clicks: u64,
}

/// Append-only progress ledger in `SQLite`.
///
/// Clones share one sync mark; separate handles (or processes) each keep their own.
#[derive(Clone)]
pub struct SqliteRepository {
    pool: SqlitePool,
    mark: Arc<Mutex<SyncMark>>,
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SqliteInitError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// `sqlite::memory:` gives every pooled connection its own database.
fn is_private_memory(database_url: &str) -> bool {
    database_url == "sqlite::memory:"
}

impl SqliteRepository {
    /// Connect to `SQLite` using the given URL.
    ///
    /// A private in-memory URL is served by a single long-lived connection so the
    /// migrated schema stays visible.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if the connection cannot be established or if
    /// connection pragmas fail during setup.
    pub async fn connect(database_url: &str) -> Result<Self, SqliteInitError> {
        let options = if is_private_memory(database_url) {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = options
            .acquire_timeout(Duration::from_secs(5))
            .after_connect(|conn, _meta| {
                Box::pin(async move {
                    sqlx::query("PRAGMA journal_mode = WAL;")
                        .execute(&mut *conn)
                        .await?;
                    sqlx::query("PRAGMA busy_timeout = 5000;")
                        .execute(&mut *conn)
                        .await?;
                    Ok(())
                })
            })
            .connect(database_url)
            .await?;
        Ok(Self {
            pool,
            mark: Arc::new(Mutex::new(SyncMark::default())),
        })
    }

    /// Create tables if they do not exist.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if migration queries fail.
    pub async fn migrate(&self) -> Result<(), SqliteInitError> {
        migrate::run_migrations(&self.pool).await
    }
}

impl Storage {
    /// Build a `Storage` backed by `SQLite`.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if connection or migrations cannot be
    /// completed.
    pub async fn sqlite(database_url: &str) -> Result<Self, SqliteInitError> {
        let repo = SqliteRepository::connect(database_url).await?;
        repo.migrate().await?;
        let progress: Arc<dyn ProgressRepository> = Arc::new(repo);
        Ok(Self { progress })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repository_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SqliteRepository>();
    }

    #[test]
    fn only_plain_memory_urls_are_private() {
        assert!(is_private_memory("sqlite::memory:"));
        assert!(!is_private_memory("sqlite:file:shared?mode=memory&cache=shared"));
        assert!(!is_private_memory("sqlite:///tmp/progress.db"));
    }
}
