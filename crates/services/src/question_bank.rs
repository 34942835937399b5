use std::path::Path;

use quiz_core::model::{Category, Difficulty, QuestionId, QuestionIndex};
use storage::questions::{QuestionFile, read_question_file};
use storage::repository::StorageError;

use crate::error::SourceLoadError;

/// What happened while indexing a question source.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Questions placed in the index.
    pub indexed: usize,
    /// Topics that map to no canonical category; these questions are not selectable.
    pub unmapped_topic: usize,
    pub unknown_difficulty: usize,
    /// Records that failed question validation.
    pub invalid: usize,
    pub warning: Option<SourceLoadError>,
}

impl LoadReport {
    #[must_use]
    pub fn dropped(&self) -> usize {
        self.unmapped_topic + self.unknown_difficulty + self.invalid
    }
}

/// Per-category counts for the topic picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCount {
    pub category: Category,
    pub easy: usize,
    pub medium: usize,
    pub hard: usize,
}

impl CategoryCount {
    #[must_use]
    pub fn total(&self) -> usize {
        self.easy + self.medium + self.hard
    }
}

/// The question repository: an immutable index built from the external source.
#[derive(Debug, Clone, Default)]
pub struct QuestionBank {
    index: QuestionIndex,
}

impl QuestionBank {
    #[must_use]
    pub fn new(index: QuestionIndex) -> Self {
        Self { index }
    }

    /// Load and index the question file at `path`.
    ///
    /// Never fails: a missing or unreadable source yields an empty bank and a
    /// `SourceLoadError` in the report.
    pub async fn load(path: &Path) -> (Self, LoadReport) {
        match read_question_file(path).await {
            Ok(file) => {
                let (bank, report) = Self::from_file(file);
                tracing::info!(
                    path = %path.display(),
                    indexed = report.indexed,
                    dropped = report.dropped(),
                    "question bank loaded"
                );
                (bank, report)
            }
            Err(err) => {
                let warning = match err {
                    StorageError::NotFound => SourceLoadError::Missing {
                        path: path.to_path_buf(),
                    },
                    other => SourceLoadError::Unreadable {
                        path: path.to_path_buf(),
                        source: other,
                    },
                };
                tracing::warn!(error = %warning, "falling back to an empty question bank");
                let report = LoadReport {
                    warning: Some(warning),
                    ..LoadReport::default()
                };
                (Self::default(), report)
            }
        }
    }

    /// Normalize parsed records into the index.
    ///
    /// Topics go through the category alias table; difficulties are
    /// case-insensitive. Records that fit neither, or that fail validation, are
    /// counted and skipped.
    #[must_use]
    pub fn from_file(file: QuestionFile) -> (Self, LoadReport) {
        let mut report = LoadReport::default();
        let mut questions = Vec::with_capacity(file.questions.len());

        for (position, record) in file.questions.into_iter().enumerate() {
            let Some(category) = Category::from_topic(&record.topic) else {
                tracing::debug!(position, topic = %record.topic, "topic has no category");
                report.unmapped_topic += 1;
                continue;
            };
            let Ok(difficulty) = record.raw_difficulty().parse::<Difficulty>() else {
                report.unknown_difficulty += 1;
                continue;
            };
            let id = QuestionId::new(u64::try_from(position).unwrap_or(u64::MAX));
            match record.into_draft().validate(id, category, difficulty) {
                Ok(question) => questions.push(question),
                Err(err) => {
                    tracing::debug!(position, error = %err, "skipping invalid question");
                    report.invalid += 1;
                }
            }
        }

        if report.invalid > 0 {
            tracing::warn!(count = report.invalid, "skipped malformed questions");
        }

        report.indexed = questions.len();
        (Self::new(QuestionIndex::from_questions(questions)), report)
    }

    #[must_use]
    pub fn index(&self) -> &QuestionIndex {
        &self.index
    }

    /// Question counts per category in catalog order.
    #[must_use]
    pub fn category_counts(&self) -> Vec<CategoryCount> {
        Category::ALL
            .into_iter()
            .map(|category| CategoryCount {
                category,
                easy: self.index.pool(category, Difficulty::Easy).len(),
                medium: self.index.pool(category, Difficulty::Medium).len(),
                hard: self.index.pool(category, Difficulty::Hard).len(),
            })
            .collect()
    }
}
