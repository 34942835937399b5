//! Shared error types for the services crate.

use std::path::PathBuf;

use thiserror::Error;

use quiz_core::model::{ExamError, LedgerError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

use crate::sessions::SessionState;

/// Why the question source could not be used.
///
/// This is a warning: loading degrades to an empty question bank.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SourceLoadError {
    #[error("question source {} not found", path.display())]
    Missing { path: PathBuf },
    #[error("question source {} could not be read: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: StorageError,
    },
}

/// Errors emitted by quiz sessions.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum SessionError {
    #[error(transparent)]
    Exam(#[from] ExamError),
    #[error("{choice:?} is not one of the current question's options")]
    InvalidChoice { choice: String },
    #[error("cannot {action} while the session is {state}")]
    InvalidState {
        action: &'static str,
        state: SessionState,
    },
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// A ledger change could not be written to its store.
///
/// The in-memory ledger keeps the change; the next successful persist writes it.
#[derive(Debug, Error)]
#[error("failed to persist progress: {0}")]
pub struct PersistError(#[from] pub StorageError);

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
