use std::sync::Arc;

use quiz_core::model::ExamSpec;
use rand::Rng;

use super::service::{Advance, AnswerFeedback, QuizSession, SessionResult};
use crate::Clock;
use crate::composer::ExamComposer;
use crate::error::SessionError;
use crate::progress_service::{ProgressService, Recorded};
use crate::question_bank::QuestionBank;

/// Result of moving past a question through the loop service.
#[derive(Debug)]
pub enum LoopStep {
    Next,
    Completed {
        result: SessionResult,
        recorded: Recorded,
    },
}

/// Orchestrates exam composition, timed answering, and recording on completion.
#[derive(Clone)]
pub struct QuizLoopService {
    clock: Clock,
    composer: ExamComposer,
    bank: Arc<QuestionBank>,
}

impl QuizLoopService {
    #[must_use]
    pub fn new(clock: Clock, composer: ExamComposer, bank: Arc<QuestionBank>) -> Self {
        Self {
            clock,
            composer,
            bank,
        }
    }

    #[must_use]
    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    #[must_use]
    pub fn composer(&self) -> &ExamComposer {
        &self.composer
    }

    /// Compose an exam and start a session over it.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Exam` if the bank cannot supply the exam.
    pub fn start_exam(&self, spec: ExamSpec) -> Result<QuizSession, SessionError> {
        let exam = self.composer.compose(self.bank.index(), spec)?;
        Ok(QuizSession::from_exam(exam, self.clock.now()))
    }

    /// Like [`Self::start_exam`] with a caller-supplied random source.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Exam` if the bank cannot supply the exam.
    pub fn start_exam_with_rng<R: Rng + ?Sized>(
        &self,
        spec: ExamSpec,
        rng: &mut R,
    ) -> Result<QuizSession, SessionError> {
        let exam = self
            .composer
            .compose_with_rng(self.bank.index(), spec, rng)?;
        Ok(QuizSession::from_exam(exam, self.clock.now()))
    }

    /// Answer the current question, timed by the service clock.
    ///
    /// # Errors
    ///
    /// Returns the session's `InvalidState` or `InvalidChoice` errors.
    pub fn submit(
        &self,
        session: &mut QuizSession,
        choice: &str,
    ) -> Result<AnswerFeedback, SessionError> {
        session
            .submit_answer(choice, self.clock.now())
            .map(Clone::clone)
    }

    /// Move to the next question; on completion, record the result in `progress`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidState` if the current question is unanswered, or
    /// `SessionError::Ledger` if the result cannot be recorded.
    pub async fn advance(
        &self,
        session: &mut QuizSession,
        progress: &mut ProgressService,
    ) -> Result<LoopStep, SessionError> {
        match session.advance(self.clock.now())? {
            Advance::Next => Ok(LoopStep::Next),
            Advance::Completed(result) => {
                let recorded = progress.record_result(&result).await?;
                Ok(LoopStep::Completed { result, recorded })
            }
        }
    }
}
