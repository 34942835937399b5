use std::path::{Path, PathBuf};
use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::composer::ExamComposer;
use crate::error::AppServicesError;
use crate::progress_service::ProgressService;
use crate::question_bank::{LoadReport, QuestionBank};
use crate::sessions::QuizLoopService;

/// Where the progress ledger lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressBackend {
    /// Legacy parallel-array JSON file.
    JsonFile(PathBuf),
    /// `SQLite` database URL, e.g. `sqlite://progress.db`.
    Sqlite(String),
    InMemory,
}

impl ProgressBackend {
    /// Pick a backend from a location string: `sqlite:` URLs select `SQLite`,
    /// anything else is a JSON file path.
    #[must_use]
    pub fn from_location(location: &str) -> Self {
        if location.starts_with("sqlite:") {
            Self::Sqlite(location.to_string())
        } else {
            Self::JsonFile(PathBuf::from(location))
        }
    }

    async fn open(&self) -> Result<Storage, AppServicesError> {
        Ok(match self {
            Self::JsonFile(path) => Storage::json_file(path.clone()),
            Self::Sqlite(url) => Storage::sqlite(url).await?,
            Self::InMemory => Storage::in_memory(),
        })
    }
}

/// Assembles app-facing services: the question bank, the quiz loop, and progress.
pub struct AppServices {
    quiz_loop: Arc<QuizLoopService>,
    progress: ProgressService,
    load_report: LoadReport,
}

impl AppServices {
    /// Load the question source and the progress ledger.
    ///
    /// The question source and an existing ledger are loaded tolerantly; see
    /// [`QuestionBank::load`] and [`ProgressService::load`].
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` only if the progress backend cannot be opened.
    pub async fn open(
        questions: &Path,
        backend: &ProgressBackend,
        composer: ExamComposer,
        clock: Clock,
    ) -> Result<Self, AppServicesError> {
        let storage = backend.open().await?;
        let (bank, load_report) = QuestionBank::load(questions).await;
        let progress = ProgressService::load(clock, Arc::clone(&storage.progress)).await;
        let quiz_loop = Arc::new(QuizLoopService::new(clock, composer, Arc::new(bank)));

        Ok(Self {
            quiz_loop,
            progress,
            load_report,
        })
    }

    #[must_use]
    pub fn quiz_loop(&self) -> Arc<QuizLoopService> {
        Arc::clone(&self.quiz_loop)
    }

    #[must_use]
    pub fn bank(&self) -> &QuestionBank {
        self.quiz_loop.bank()
    }

    #[must_use]
    pub fn progress(&self) -> &ProgressService {
        &self.progress
    }

    pub fn progress_mut(&mut self) -> &mut ProgressService {
        &mut self.progress
    }

    /// How the question source was indexed, including any fallback warning.
    #[must_use]
    pub fn load_report(&self) -> &LoadReport {
        &self.load_report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlite_urls_select_sqlite() {
        assert_eq!(
            ProgressBackend::from_location("sqlite://progress.db"),
            ProgressBackend::Sqlite("sqlite://progress.db".into())
        );
        assert_eq!(
            ProgressBackend::from_location("sqlite::memory:"),
            ProgressBackend::Sqlite("sqlite::memory:".into())
        );
    }

    #[test]
    fn other_locations_are_json_files() {
        assert_eq!(
            ProgressBackend::from_location("Data/progress_data.json"),
            ProgressBackend::JsonFile(PathBuf::from("Data/progress_data.json"))
        );
    }
}
