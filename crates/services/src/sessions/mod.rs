mod progress;
mod service;
mod view;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use progress::SessionProgress;
pub use service::{
    Advance, AnswerFeedback, AnswerOutcome, QuizSession, SessionResult, SessionState,
};
pub use view::{HistoryRow, format_clock, format_percent};
pub use workflow::{LoopStep, QuizLoopService};
