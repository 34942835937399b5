use std::sync::Arc;

use quiz_core::model::{LedgerStats, ProgressEntry, ProgressLedger};
use storage::repository::{ProgressRepository, StorageError};
use tracing::{debug, info, warn};

use crate::Clock;
use crate::error::{PersistError, SessionError};
use crate::sessions::SessionResult;

/// Outcome of recording a completed exam.
///
/// The entry is always in the in-memory ledger; `persisted` says whether the store
/// caught up.
#[derive(Debug)]
pub struct Recorded {
    pub entry: ProgressEntry,
    pub persisted: Result<(), PersistError>,
}

/// Outcome of a registration click.
#[derive(Debug)]
pub struct RegistrationClick {
    pub clicks: u64,
    pub persisted: Result<(), PersistError>,
}

/// Owns the progress ledger and writes it through to a repository.
pub struct ProgressService {
    clock: Clock,
    repo: Arc<dyn ProgressRepository>,
    ledger: ProgressLedger,
}

impl ProgressService {
    /// Start from an already loaded ledger.
    #[must_use]
    pub fn new(clock: Clock, repo: Arc<dyn ProgressRepository>, ledger: ProgressLedger) -> Self {
        Self {
            clock,
            repo,
            ledger,
        }
    }

    /// Load the ledger from `repo`.
    ///
    /// Never fails: a missing store starts an empty ledger, and an unreadable or
    /// corrupt one does the same after logging a warning.
    pub async fn load(clock: Clock, repo: Arc<dyn ProgressRepository>) -> Self {
        let ledger = match repo.load_ledger().await {
            Ok(ledger) => {
                debug!(attempts = ledger.len(), "progress ledger loaded");
                ledger
            }
            Err(StorageError::NotFound) => {
                info!("no progress recorded yet, starting an empty ledger");
                ProgressLedger::new()
            }
            Err(err) => {
                warn!(error = %err, "progress store unusable, starting an empty ledger");
                ProgressLedger::new()
            }
        };
        Self::new(clock, repo, ledger)
    }

    #[must_use]
    pub fn ledger(&self) -> &ProgressLedger {
        &self.ledger
    }

    #[must_use]
    pub fn stats(&self) -> LedgerStats {
        self.ledger.stats()
    }

    /// Append a completed exam to the ledger and persist it.
    ///
    /// The entry is dated by the session's completion time.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Ledger` if the result cannot form a valid entry. A
    /// persistence failure is not an error here; it is reported in `Recorded`.
    pub async fn record_result(&mut self, result: &SessionResult) -> Result<Recorded, SessionError> {
        let entry = self
            .ledger
            .append(
                result.score,
                result.total_secs,
                Some(result.average_secs),
                result.completed_at.date_naive(),
            )?
            .clone();
        info!(
            attempt = entry.attempt(),
            score = entry.score(),
            exam = %result.label,
            "exam recorded"
        );

        let persisted = self.persist().await;
        Ok(Recorded { entry, persisted })
    }

    /// Count a click on the registration link and persist it.
    pub async fn record_registration_click(&mut self) -> RegistrationClick {
        let clicks = self.ledger.record_registration_click(self.clock.now());
        debug!(clicks, "registration click recorded");
        let persisted = self.persist().await;
        RegistrationClick { clicks, persisted }
    }

    /// Write the whole ledger to the repository.
    ///
    /// # Errors
    ///
    /// Returns `PersistError` if the store rejects the write. The in-memory ledger is
    /// left as it is.
    pub async fn persist(&self) -> Result<(), PersistError> {
        self.repo.save_ledger(&self.ledger).await.map_err(|err| {
            warn!(error = %err, "failed to persist progress ledger");
            PersistError::from(err)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Duration;
    use quiz_core::time::{fixed_clock, fixed_now};
    use storage::repository::InMemoryRepository;

    struct FailingRepository {
        load: fn() -> StorageError,
    }

    #[async_trait]
    impl ProgressRepository for FailingRepository {
        async fn load_ledger(&self) -> Result<ProgressLedger, StorageError> {
            Err((self.load)())
        }

        async fn save_ledger(&self, _ledger: &ProgressLedger) -> Result<(), StorageError> {
            Err(StorageError::Io("disk full".into()))
        }
    }

    fn result(correct: usize, total: usize) -> SessionResult {
        #[allow(clippy::cast_precision_loss)]
        let score = correct as f64 / total as f64;
        SessionResult {
            label: "Quick Quiz".into(),
            correct,
            total,
            score,
            total_secs: 50.0,
            average_secs: 10.0,
            started_at: fixed_now(),
            completed_at: fixed_now() + Duration::seconds(50),
        }
    }

    #[tokio::test]
    async fn load_missing_store_starts_empty() {
        let service = ProgressService::load(fixed_clock(), Arc::new(InMemoryRepository::new())).await;
        assert!(service.ledger().is_empty());
        assert_eq!(service.stats().attempts, 0);
    }

    #[tokio::test]
    async fn load_corrupt_store_starts_empty() {
        let repo = FailingRepository {
            load: || StorageError::Serialization("bad json".into()),
        };
        let service = ProgressService::load(fixed_clock(), Arc::new(repo)).await;
        assert!(service.ledger().is_empty());
    }

    #[tokio::test]
    async fn record_result_appends_and_persists() {
        let repo = Arc::new(InMemoryRepository::new());
        let mut service = ProgressService::load(fixed_clock(), repo.clone()).await;

        let first = service.record_result(&result(3, 5)).await.unwrap();
        assert!(first.persisted.is_ok());
        assert_eq!(first.entry.attempt(), 1);
        assert!((first.entry.score() - 0.6).abs() < 1e-9);
        assert_eq!(first.entry.time_spent_secs(), 50.0);
        assert_eq!(first.entry.average_secs(), Some(10.0));
        assert_eq!(first.entry.date(), fixed_now().date_naive());

        let second = service.record_result(&result(5, 5)).await.unwrap();
        assert_eq!(second.entry.attempt(), 2);

        let stored = repo.load_ledger().await.unwrap();
        assert_eq!(&stored, service.ledger());
    }

    #[tokio::test]
    async fn persist_failure_keeps_in_memory_entry() {
        let repo = FailingRepository {
            load: || StorageError::NotFound,
        };
        let mut service = ProgressService::load(fixed_clock(), Arc::new(repo)).await;

        let recorded = service.record_result(&result(1, 2)).await.unwrap();
        assert!(matches!(
            recorded.persisted,
            Err(PersistError(StorageError::Io(_)))
        ));
        assert_eq!(service.ledger().len(), 1);
    }

    #[tokio::test]
    async fn invalid_result_is_rejected_without_append() {
        let mut service =
            ProgressService::load(fixed_clock(), Arc::new(InMemoryRepository::new())).await;
        let mut bad = result(1, 2);
        bad.score = 1.5;

        let err = service.record_result(&bad).await.unwrap_err();
        assert!(matches!(err, SessionError::Ledger(_)));
        assert!(service.ledger().is_empty());
    }

    #[tokio::test]
    async fn registration_click_is_counted_and_stamped() {
        let repo = Arc::new(InMemoryRepository::new());
        let mut service = ProgressService::load(fixed_clock(), repo.clone()).await;

        assert_eq!(service.record_registration_click().await.clicks, 1);
        let click = service.record_registration_click().await;
        assert_eq!(click.clicks, 2);
        assert!(click.persisted.is_ok());

        let stored = repo.load_ledger().await.unwrap();
        assert_eq!(stored.registration_clicks(), 2);
        assert_eq!(stored.last_registration_click(), Some(fixed_now()));
    }
}
