mod category;
mod difficulty;
mod exam;
mod ids;
mod index;
mod ledger;
mod question;

pub use category::Category;
pub use difficulty::{Difficulty, ParseDifficultyError};
pub use exam::{ComposerSettings, Exam, ExamError, ExamSpec, SettingsError};
pub use ids::{ParseIdError, QuestionId};
pub use index::QuestionIndex;
pub use ledger::{LedgerError, LedgerStats, ProgressEntry, ProgressLedger};
pub use question::{Question, QuestionDraft, QuestionError};
