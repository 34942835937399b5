use std::path::{Path, PathBuf};

use async_trait::async_trait;
use quiz_core::model::ProgressLedger;
use tokio::sync::Mutex;

use crate::repository::{ProgressRepository, StorageError};

mod record;

pub use record::ProgressRecord;

/// Progress ledger stored as a single JSON file.
///
/// Every save rewrites the whole file. Reads and writes are serialized through an
/// async mutex, and writes go to a sibling temp file that is renamed over the
/// target, so readers never observe a partially written ledger.
#[derive(Debug)]
pub struct JsonProgressStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonProgressStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl ProgressRepository for JsonProgressStore {
    async fn load_ledger(&self) -> Result<ProgressLedger, StorageError> {
        let _guard = self.lock.lock().await;
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| StorageError::from_io(&e))?;
        let record: ProgressRecord = serde_json::from_str(&raw)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        record.into_ledger()
    }

    async fn save_ledger(&self, ledger: &ProgressLedger) -> Result<(), StorageError> {
        let body = serde_json::to_vec(&ProgressRecord::from_ledger(ledger))
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        let _guard = self.lock.lock().await;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::Io(e.to_string()))?;
        }
        let temp = self.temp_path();
        tokio::fs::write(&temp, &body)
            .await
            .map_err(|e| StorageError::Io(e.to_string()))?;
        tokio::fs::rename(&temp, &self.path)
            .await
            .map_err(|e| StorageError::Io(e.to_string()))?;

        tracing::debug!(path = %self.path.display(), entries = ledger.len(), "progress saved");
        Ok(())
    }
}
