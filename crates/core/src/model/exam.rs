use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::model::{Category, Difficulty, Question};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// A composition that cannot be turned into a session.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ExamError {
    #[error("no questions available for {label}")]
    NoQuestions { label: String },

    #[error("not enough questions for {label}: need {required}, found {available}")]
    TooFewQuestions {
        label: String,
        required: usize,
        available: usize,
    },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("{field} must be > 0")]
    Zero { field: &'static str },

    #[error("balanced minimum ({minimum}) exceeds what three levels can supply ({ceiling})")]
    UnreachableBalancedMinimum { minimum: usize, ceiling: usize },
}

//
// ─── EXAM SPEC ─────────────────────────────────────────────────────────────────
//

/// How an exam is assembled from the question index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum ExamSpec {
    /// A few questions per category at a single difficulty.
    ByDifficulty { difficulty: Difficulty },
    /// Every question of one category, capped.
    ByCategory { category: Category },
    /// Mixed difficulty; `exam_number` only distinguishes the label.
    Balanced { exam_number: u32 },
    SuperHard,
    Quick,
    RandomMix,
}

impl ExamSpec {
    /// Stable strategy tag.
    #[must_use]
    pub fn strategy(&self) -> &'static str {
        match self {
            ExamSpec::ByDifficulty { .. } => "by_difficulty",
            ExamSpec::ByCategory { .. } => "by_category",
            ExamSpec::Balanced { .. } => "balanced",
            ExamSpec::SuperHard => "super_hard",
            ExamSpec::Quick => "quick",
            ExamSpec::RandomMix => "random_mix",
        }
    }

    /// Title shown while the exam is running.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            ExamSpec::ByDifficulty { difficulty } => format!("{} Exam", difficulty.title()),
            ExamSpec::ByCategory { category } => category.name().to_string(),
            ExamSpec::Balanced { exam_number } => format!("Balanced Exam {exam_number}"),
            ExamSpec::SuperHard => "Super Hard Exam".to_string(),
            ExamSpec::Quick => "Quick Quiz".to_string(),
            ExamSpec::RandomMix => "Random Mix".to_string(),
        }
    }
}

impl fmt::Display for ExamSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

//
// ─── SETTINGS ──────────────────────────────────────────────────────────────────
//

/// Sampling limits used by the exam composer.
///
/// The defaults reproduce the practice-exam rules:
/// - 2 questions per category for single-difficulty and balanced exams
/// - 20 questions max for a category exam
/// - 10 per difficulty level, at least 15 overall, for balanced exams
/// - 3 hard questions per category for the super hard exam
/// - 5 questions for a quick quiz, 20 for a random mix
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposerSettings {
    per_category: usize,
    category_limit: usize,
    balanced_per_difficulty: usize,
    balanced_minimum: usize,
    super_hard_per_category: usize,
    quick_size: usize,
    random_mix_size: usize,
}

impl Default for ComposerSettings {
    fn default() -> Self {
        Self {
            per_category: 2,
            category_limit: 20,
            balanced_per_difficulty: 10,
            balanced_minimum: 15,
            super_hard_per_category: 3,
            quick_size: 5,
            random_mix_size: 20,
        }
    }
}

impl ComposerSettings {
    /// Creates custom composer settings.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::Zero` if any limit is zero, or
    /// `SettingsError::UnreachableBalancedMinimum` if the balanced minimum is larger
    /// than three full difficulty levels.
    pub fn new(
        per_category: usize,
        category_limit: usize,
        balanced_per_difficulty: usize,
        balanced_minimum: usize,
        super_hard_per_category: usize,
        quick_size: usize,
        random_mix_size: usize,
    ) -> Result<Self, SettingsError> {
        for (field, value) in [
            ("per_category", per_category),
            ("category_limit", category_limit),
            ("balanced_per_difficulty", balanced_per_difficulty),
            ("balanced_minimum", balanced_minimum),
            ("super_hard_per_category", super_hard_per_category),
            ("quick_size", quick_size),
            ("random_mix_size", random_mix_size),
        ] {
            if value == 0 {
                return Err(SettingsError::Zero { field });
            }
        }

        let ceiling = balanced_per_difficulty.saturating_mul(Difficulty::ALL.len());
        if balanced_minimum > ceiling {
            return Err(SettingsError::UnreachableBalancedMinimum {
                minimum: balanced_minimum,
                ceiling,
            });
        }

        Ok(Self {
            per_category,
            category_limit,
            balanced_per_difficulty,
            balanced_minimum,
            super_hard_per_category,
            quick_size,
            random_mix_size,
        })
    }

    #[must_use]
    pub fn per_category(&self) -> usize {
        self.per_category
    }

    #[must_use]
    pub fn category_limit(&self) -> usize {
        self.category_limit
    }

    #[must_use]
    pub fn balanced_per_difficulty(&self) -> usize {
        self.balanced_per_difficulty
    }

    #[must_use]
    pub fn balanced_minimum(&self) -> usize {
        self.balanced_minimum
    }

    #[must_use]
    pub fn super_hard_per_category(&self) -> usize {
        self.super_hard_per_category
    }

    #[must_use]
    pub fn quick_size(&self) -> usize {
        self.quick_size
    }

    #[must_use]
    pub fn random_mix_size(&self) -> usize {
        self.random_mix_size
    }
}

//
// ─── EXAM ──────────────────────────────────────────────────────────────────────
//

/// A composed, non-empty, ordered list of questions ready to be taken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exam {
    spec: ExamSpec,
    label: String,
    questions: Vec<Question>,
}

impl Exam {
    /// # Errors
    ///
    /// Returns `ExamError::NoQuestions` if `questions` is empty.
    pub fn new(spec: ExamSpec, questions: Vec<Question>) -> Result<Self, ExamError> {
        let label = spec.label();
        if questions.is_empty() {
            return Err(ExamError::NoQuestions { label });
        }
        Ok(Self {
            spec,
            label,
            questions,
        })
    }

    #[must_use]
    pub fn spec(&self) -> ExamSpec {
        self.spec
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Always false for a constructed exam; provided for API symmetry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn into_questions(self) -> Vec<Question> {
        self.questions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_match_exam_titles() {
        assert_eq!(
            ExamSpec::ByDifficulty {
                difficulty: Difficulty::Medium
            }
            .label(),
            "Medium Exam"
        );
        assert_eq!(ExamSpec::Balanced { exam_number: 3 }.label(), "Balanced Exam 3");
        assert_eq!(
            ExamSpec::ByCategory {
                category: Category::FixedIncome
            }
            .label(),
            "Fixed Income"
        );
        assert_eq!(ExamSpec::SuperHard.label(), "Super Hard Exam");
        assert_eq!(ExamSpec::Quick.strategy(), "quick");
    }

    #[test]
    fn empty_exam_is_rejected() {
        let err = Exam::new(ExamSpec::RandomMix, Vec::new()).unwrap_err();
        assert_eq!(
            err,
            ExamError::NoQuestions {
                label: "Random Mix".into()
            }
        );
    }

    #[test]
    fn settings_reject_zero_limits() {
        let err = ComposerSettings::new(0, 20, 10, 15, 3, 5, 20).unwrap_err();
        assert_eq!(err, SettingsError::Zero { field: "per_category" });
    }

    #[test]
    fn settings_reject_unreachable_balanced_minimum() {
        let err = ComposerSettings::new(2, 20, 4, 15, 3, 5, 20).unwrap_err();
        assert_eq!(
            err,
            SettingsError::UnreachableBalancedMinimum {
                minimum: 15,
                ceiling: 12
            }
        );
    }

    #[test]
    fn default_settings_are_valid() {
        let d = ComposerSettings::default();
        let rebuilt = ComposerSettings::new(
            d.per_category(),
            d.category_limit(),
            d.balanced_per_difficulty(),
            d.balanced_minimum(),
            d.super_hard_per_category(),
            d.quick_size(),
            d.random_mix_size(),
        )
        .unwrap();
        assert_eq!(rebuilt, d);
    }
}
