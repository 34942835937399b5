use chrono::{DateTime, Utc};
use std::fmt;

use quiz_core::model::{Exam, ExamError, Question, QuestionId};
use quiz_core::time::seconds_between;

use super::progress::SessionProgress;
use crate::error::SessionError;

//
// ─── STATE ─────────────────────────────────────────────────────────────────────
//

/// Where a session is in its lifecycle.
///
/// `AwaitingAnswer` and `Submitted` are the two sub-states of an in-progress
/// question; `Completed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingAnswer,
    Submitted,
    Completed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SessionState::AwaitingAnswer => "awaiting an answer",
            SessionState::Submitted => "showing a submitted answer",
            SessionState::Completed => "completed",
        })
    }
}

//
// ─── RESULTS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOutcome {
    Correct,
    Incorrect,
}

/// Captures the outcome of answering one question within a session.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerFeedback {
    pub question_id: QuestionId,
    pub choice: String,
    pub outcome: AnswerOutcome,
    pub correct_answer: String,
    pub explanation: Option<String>,
    pub elapsed_secs: f64,
}

impl AnswerFeedback {
    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.outcome == AnswerOutcome::Correct
    }
}

/// Result of moving past a submitted question.
#[derive(Debug, Clone, PartialEq)]
pub enum Advance {
    /// The next question is now current.
    Next,
    /// That was the last question.
    Completed(SessionResult),
}

/// Final numbers for a completed session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionResult {
    pub label: String,
    pub correct: usize,
    pub total: usize,
    /// `correct / total`.
    pub score: f64,
    pub total_secs: f64,
    /// Mean of the per-question timings, 0 when none were recorded.
    pub average_secs: f64,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One attempt at an exam.
///
/// Steps through the questions in order: each question is first answered with
/// `submit_answer`, then left with `advance`. Timestamps are passed in by the
/// caller so the services layer clock stays the single source of time.
#[derive(Clone)]
pub struct QuizSession {
    label: String,
    questions: Vec<Question>,
    current: usize,
    score: usize,
    timings: Vec<f64>,
    answers: Vec<AnswerFeedback>,
    submitted: bool,
    started_at: DateTime<Utc>,
    question_started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl QuizSession {
    /// Start a session over `questions`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Exam` with `ExamError::NoQuestions` if `questions` is empty.
    pub fn start(
        label: impl Into<String>,
        questions: Vec<Question>,
        started_at: DateTime<Utc>,
    ) -> Result<Self, SessionError> {
        let label = label.into();
        if questions.is_empty() {
            return Err(ExamError::NoQuestions { label }.into());
        }

        Ok(Self {
            label,
            questions,
            current: 0,
            score: 0,
            timings: Vec::new(),
            answers: Vec::new(),
            submitted: false,
            started_at,
            question_started_at: started_at,
            completed_at: None,
        })
    }

    /// Start a session over a composed exam.
    #[must_use]
    pub fn from_exam(exam: Exam, started_at: DateTime<Utc>) -> Self {
        let label = exam.label().to_string();
        let questions = exam.into_questions();
        Self {
            label,
            questions,
            current: 0,
            score: 0,
            timings: Vec::new(),
            answers: Vec::new(),
            submitted: false,
            started_at,
            question_started_at: started_at,
            completed_at: None,
        }
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        if self.completed_at.is_some() {
            SessionState::Completed
        } else if self.submitted {
            SessionState::Submitted
        } else {
            SessionState::AwaitingAnswer
        }
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// 0-based position of the current question; equals `total()` once completed.
    #[must_use]
    pub fn index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.questions.len()
    }

    /// Correct answers so far.
    #[must_use]
    pub fn score(&self) -> usize {
        self.score
    }

    /// Seconds spent on each submitted question, in order.
    #[must_use]
    pub fn timings(&self) -> &[f64] {
        &self.timings
    }

    #[must_use]
    pub fn answers(&self) -> &[AnswerFeedback] {
        &self.answers
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        if self.is_complete() {
            return None;
        }
        self.questions.get(self.current)
    }

    /// Whether the current question has been answered (the UI shows "next").
    #[must_use]
    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.completed_at.is_some()
    }

    /// Progress-bar fraction: the current question's 1-based position over the total.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn progress_fraction(&self) -> f64 {
        let shown = (self.current + 1).min(self.questions.len());
        shown as f64 / self.questions.len() as f64
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress {
            total: self.total(),
            answered: self.answers.len(),
            remaining: self.total().saturating_sub(self.answers.len()),
            correct: self.score,
            is_complete: self.is_complete(),
        }
    }

    /// Answer the current question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidState` unless the current question is awaiting an
    /// answer, and `SessionError::InvalidChoice` if `choice` is not one of its options.
    /// The session is unchanged on error.
    pub fn submit_answer(
        &mut self,
        choice: &str,
        answered_at: DateTime<Utc>,
    ) -> Result<&AnswerFeedback, SessionError> {
        let state = self.state();
        if state != SessionState::AwaitingAnswer {
            return Err(SessionError::InvalidState {
                action: "submit an answer",
                state,
            });
        }
        let question = &self.questions[self.current];
        if !question.has_option(choice) {
            return Err(SessionError::InvalidChoice {
                choice: choice.to_string(),
            });
        }

        let elapsed_secs = seconds_between(self.question_started_at, answered_at);
        let outcome = if question.is_correct(choice) {
            AnswerOutcome::Correct
        } else {
            AnswerOutcome::Incorrect
        };
        let feedback = AnswerFeedback {
            question_id: question.id(),
            choice: choice.to_string(),
            outcome,
            correct_answer: question.correct_answer().to_string(),
            explanation: question.explanation().map(str::to_string),
            elapsed_secs,
        };

        if outcome == AnswerOutcome::Correct {
            self.score += 1;
        }
        self.timings.push(elapsed_secs);
        self.submitted = true;
        self.answers.push(feedback);

        self.answers.last().ok_or(SessionError::InvalidState {
            action: "submit an answer",
            state,
        })
    }

    /// Move past the submitted question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidState` unless the current question has been
    /// submitted.
    pub fn advance(&mut self, now: DateTime<Utc>) -> Result<Advance, SessionError> {
        let state = self.state();
        if state != SessionState::Submitted {
            return Err(SessionError::InvalidState {
                action: "advance",
                state,
            });
        }

        self.current += 1;
        self.submitted = false;
        self.question_started_at = now;

        if self.current < self.questions.len() {
            return Ok(Advance::Next);
        }

        self.completed_at = Some(now);
        self.result()
            .map(Advance::Completed)
            .ok_or(SessionError::InvalidState {
                action: "advance",
                state: SessionState::Completed,
            })
    }

    /// Final numbers, available once the session is completed.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn result(&self) -> Option<SessionResult> {
        let completed_at = self.completed_at?;
        let total = self.questions.len();
        let average_secs = if self.timings.is_empty() {
            0.0
        } else {
            self.timings.iter().sum::<f64>() / self.timings.len() as f64
        };

        Some(SessionResult {
            label: self.label.clone(),
            correct: self.score,
            total,
            score: self.score as f64 / total as f64,
            total_secs: seconds_between(self.started_at, completed_at),
            average_secs,
            started_at: self.started_at,
            completed_at,
        })
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("label", &self.label)
            .field("questions_len", &self.questions.len())
            .field("current", &self.current)
            .field("score", &self.score)
            .field("submitted", &self.submitted)
            .field("started_at", &self.started_at)
            .field("completed_at", &self.completed_at)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
