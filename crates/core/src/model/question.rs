use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{Category, Difficulty, QuestionId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question text cannot be empty")]
    EmptyText,

    #[error("a question needs at least two options, got {count}")]
    TooFewOptions { count: usize },

    #[error("correct answer {answer:?} is not one of the options")]
    AnswerNotAnOption { answer: String },
}

//
// ─── DRAFT ─────────────────────────────────────────────────────────────────────
//

/// Unvalidated question fields as they arrive from a question source.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QuestionDraft {
    pub topic: String,
    pub text: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub explanation: Option<String>,
}

impl QuestionDraft {
    /// Validate the draft into an immutable `Question`.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` when the text is blank, fewer than two options are
    /// given, or the correct answer does not exactly match one of the options.
    pub fn validate(
        self,
        id: QuestionId,
        category: Category,
        difficulty: Difficulty,
    ) -> Result<Question, QuestionError> {
        if self.text.trim().is_empty() {
            return Err(QuestionError::EmptyText);
        }
        if self.options.len() < 2 {
            return Err(QuestionError::TooFewOptions {
                count: self.options.len(),
            });
        }
        if !self.options.iter().any(|o| *o == self.correct_answer) {
            return Err(QuestionError::AnswerNotAnOption {
                answer: self.correct_answer,
            });
        }

        let explanation = self.explanation.filter(|e| !e.trim().is_empty());

        Ok(Question {
            id,
            topic: self.topic,
            category,
            difficulty,
            text: self.text,
            options: self.options,
            correct_answer: self.correct_answer,
            explanation,
        })
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A multiple-choice question. Never mutated after validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    id: QuestionId,
    topic: String,
    category: Category,
    difficulty: Difficulty,
    text: String,
    options: Vec<String>,
    correct_answer: String,
    explanation: Option<String>,
}

impl Question {
    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    /// Topic as written in the source, before category mapping.
    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    #[must_use]
    pub fn category(&self) -> Category {
        self.category
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    #[must_use]
    pub fn explanation(&self) -> Option<&str> {
        self.explanation.as_deref()
    }

    #[must_use]
    pub fn has_option(&self, choice: &str) -> bool {
        self.options.iter().any(|o| o == choice)
    }

    /// Exact string comparison against the correct answer.
    #[must_use]
    pub fn is_correct(&self, choice: &str) -> bool {
        self.correct_answer == choice
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> QuestionDraft {
        QuestionDraft {
            topic: "Economics".into(),
            text: "Which curve slopes downward?".into(),
            options: vec!["Demand".into(), "Supply".into()],
            correct_answer: "Demand".into(),
            explanation: Some("Law of demand.".into()),
        }
    }

    #[test]
    fn validates_a_well_formed_question() {
        let q = draft()
            .validate(QuestionId::new(3), Category::Economics, Difficulty::Easy)
            .unwrap();
        assert_eq!(q.id(), QuestionId::new(3));
        assert!(q.has_option("Supply"));
        assert!(q.is_correct("Demand"));
        assert!(!q.is_correct("demand"));
        assert_eq!(q.explanation(), Some("Law of demand."));
    }

    #[test]
    fn rejects_answer_outside_options() {
        let mut d = draft();
        d.correct_answer = "Price".into();
        let err = d
            .validate(QuestionId::new(0), Category::Economics, Difficulty::Easy)
            .unwrap_err();
        assert!(matches!(err, QuestionError::AnswerNotAnOption { .. }));
    }

    #[test]
    fn rejects_single_option() {
        let mut d = draft();
        d.options.truncate(1);
        let err = d
            .validate(QuestionId::new(0), Category::Economics, Difficulty::Easy)
            .unwrap_err();
        assert_eq!(err, QuestionError::TooFewOptions { count: 1 });
    }

    #[test]
    fn blank_explanation_is_dropped() {
        let mut d = draft();
        d.explanation = Some("   ".into());
        let q = d
            .validate(QuestionId::new(0), Category::Economics, Difficulty::Easy)
            .unwrap();
        assert_eq!(q.explanation(), None);
    }
}
