use async_trait::async_trait;
use quiz_core::model::ProgressLedger;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::json::JsonProgressStore;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("io error: {0}")]
    Io(String),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl StorageError {
    pub(crate) fn from_io(err: &std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            StorageError::NotFound
        } else {
            StorageError::Io(err.to_string())
        }
    }
}

/// Repository contract for the progress ledger.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Load the persisted ledger.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if nothing has been persisted yet, or other
    /// storage errors if the store is unreadable or corrupt.
    async fn load_ledger(&self) -> Result<ProgressLedger, StorageError>;

    /// Persist the whole ledger, replacing what was stored before.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the ledger cannot be written.
    async fn save_ledger(&self, ledger: &ProgressLedger) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    ledger: Arc<Mutex<Option<ProgressLedger>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an already persisted ledger.
    #[must_use]
    pub fn with_ledger(ledger: ProgressLedger) -> Self {
        Self {
            ledger: Arc::new(Mutex::new(Some(ledger))),
        }
    }
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn load_ledger(&self) -> Result<ProgressLedger, StorageError> {
        let guard = self
            .ledger
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.clone().ok_or(StorageError::NotFound)
    }

    async fn save_ledger(&self, ledger: &ProgressLedger) -> Result<(), StorageError> {
        let mut guard = self
            .ledger
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = Some(ledger.clone());
        Ok(())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub progress: Arc<dyn ProgressRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            progress: Arc::new(InMemoryRepository::new()),
        }
    }

    /// Storage backed by a JSON progress file in the legacy parallel-array format.
    #[must_use]
    pub fn json_file(path: impl Into<PathBuf>) -> Self {
        Self {
            progress: Arc::new(JsonProgressStore::new(path)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::time::fixed_now;

    #[tokio::test]
    async fn empty_repository_reports_not_found() {
        let repo = InMemoryRepository::new();
        let err = repo.load_ledger().await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound));
    }

    #[tokio::test]
    async fn round_trips_ledger() {
        let repo = InMemoryRepository::new();
        let mut ledger = ProgressLedger::new();
        ledger
            .append(0.8, 95.0, Some(9.5), fixed_now().date_naive())
            .unwrap();
        ledger.record_registration_click(fixed_now());

        repo.save_ledger(&ledger).await.unwrap();
        let loaded = repo.load_ledger().await.unwrap();
        assert_eq!(loaded, ledger);
    }

    #[test]
    fn io_not_found_maps_to_not_found() {
        let err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert!(matches!(StorageError::from_io(&err), StorageError::NotFound));
        let err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope");
        assert!(matches!(StorageError::from_io(&err), StorageError::Io(_)));
    }
}
