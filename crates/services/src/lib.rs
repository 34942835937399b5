#![forbid(unsafe_code)]

pub mod app_services;
pub mod composer;
pub mod error;
pub mod progress_service;
pub mod question_bank;
pub mod sessions;

pub use quiz_core::Clock;

pub use app_services::{AppServices, ProgressBackend};
pub use composer::ExamComposer;
pub use error::{AppServicesError, PersistError, SessionError, SourceLoadError};
pub use progress_service::{ProgressService, Recorded, RegistrationClick};
pub use question_bank::{CategoryCount, LoadReport, QuestionBank};
pub use sessions::{
    Advance, AnswerFeedback, AnswerOutcome, LoopStep, QuizLoopService, QuizSession,
    SessionProgress, SessionResult, SessionState,
};
