use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum LedgerError {
    #[error("score ratio must be within [0, 1], got {0}")]
    InvalidScore(f64),

    #[error("durations must be finite and non-negative, got {0}")]
    InvalidDuration(f64),

    #[error("attempt numbers must run 1..=n, found {found} at position {position}")]
    AttemptOutOfSequence { position: usize, found: u32 },

    #[error("too many attempts recorded")]
    TooManyAttempts,
}

fn check_score(score: f64) -> Result<f64, LedgerError> {
    if score.is_finite() && (0.0..=1.0).contains(&score) {
        Ok(score)
    } else {
        Err(LedgerError::InvalidScore(score))
    }
}

fn check_duration(secs: f64) -> Result<f64, LedgerError> {
    if secs.is_finite() && secs >= 0.0 {
        Ok(secs)
    } else {
        Err(LedgerError::InvalidDuration(secs))
    }
}

//
// ─── ENTRY ─────────────────────────────────────────────────────────────────────
//

/// Summary of one completed exam.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEntry {
    attempt: u32,
    score: f64,
    time_spent_secs: f64,
    average_secs: Option<f64>,
    date: NaiveDate,
}

impl ProgressEntry {
    /// Rehydrate an entry from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError` if the score is outside [0, 1] or a duration is
    /// negative or not finite.
    pub fn from_persisted(
        attempt: u32,
        score: f64,
        time_spent_secs: f64,
        average_secs: Option<f64>,
        date: NaiveDate,
    ) -> Result<Self, LedgerError> {
        Ok(Self {
            attempt,
            score: check_score(score)?,
            time_spent_secs: check_duration(time_spent_secs)?,
            average_secs: average_secs.map(check_duration).transpose()?,
            date,
        })
    }

    /// 1-based attempt number.
    #[must_use]
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Fraction of questions answered correctly.
    #[must_use]
    pub fn score(&self) -> f64 {
        self.score
    }

    /// Wall-clock seconds from exam start to completion.
    #[must_use]
    pub fn time_spent_secs(&self) -> f64 {
        self.time_spent_secs
    }

    /// Mean seconds per question, when recorded.
    #[must_use]
    pub fn average_secs(&self) -> Option<f64> {
        self.average_secs
    }

    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.date
    }
}

//
// ─── LEDGER ────────────────────────────────────────────────────────────────────
//

/// Dashboard aggregates over the ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerStats {
    pub attempts: usize,
    pub average_score: Option<f64>,
    pub best_score: Option<f64>,
    pub total_study_minutes: f64,
    pub last_date: Option<NaiveDate>,
}

/// Append-only history of completed exams plus registration-interest counters.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProgressLedger {
    entries: Vec<ProgressEntry>,
    registration_clicks: u64,
    last_registration_click: Option<DateTime<Utc>>,
}

impl ProgressLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rehydrate a ledger from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::AttemptOutOfSequence` unless attempts run 1, 2, 3, ...
    pub fn from_persisted(
        entries: Vec<ProgressEntry>,
        registration_clicks: u64,
        last_registration_click: Option<DateTime<Utc>>,
    ) -> Result<Self, LedgerError> {
        for (position, entry) in entries.iter().enumerate() {
            let expected = u32::try_from(position + 1).map_err(|_| LedgerError::TooManyAttempts)?;
            if entry.attempt != expected {
                return Err(LedgerError::AttemptOutOfSequence {
                    position,
                    found: entry.attempt,
                });
            }
        }
        Ok(Self {
            entries,
            registration_clicks,
            last_registration_click,
        })
    }

    /// Append a completed exam, numbering it after the previous attempt.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError` if the score or durations are invalid; the ledger is
    /// left unchanged in that case.
    pub fn append(
        &mut self,
        score: f64,
        time_spent_secs: f64,
        average_secs: Option<f64>,
        date: NaiveDate,
    ) -> Result<&ProgressEntry, LedgerError> {
        let attempt =
            u32::try_from(self.entries.len() + 1).map_err(|_| LedgerError::TooManyAttempts)?;
        let entry =
            ProgressEntry::from_persisted(attempt, score, time_spent_secs, average_secs, date)?;
        self.entries.push(entry);
        self.entries.last().ok_or(LedgerError::TooManyAttempts)
    }

    /// Count one click on the registration link and return the new total.
    pub fn record_registration_click(&mut self, at: DateTime<Utc>) -> u64 {
        self.registration_clicks = self.registration_clicks.saturating_add(1);
        self.last_registration_click = Some(at);
        self.registration_clicks
    }

    #[must_use]
    pub fn entries(&self) -> &[ProgressEntry] {
        &self.entries
    }

    #[must_use]
    pub fn latest(&self) -> Option<&ProgressEntry> {
        self.entries.last()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn registration_clicks(&self) -> u64 {
        self.registration_clicks
    }

    #[must_use]
    pub fn last_registration_click(&self) -> Option<DateTime<Utc>> {
        self.last_registration_click
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn stats(&self) -> LedgerStats {
        let attempts = self.entries.len();
        let total_score: f64 = self.entries.iter().map(ProgressEntry::score).sum();
        let total_secs: f64 = self.entries.iter().map(ProgressEntry::time_spent_secs).sum();
        LedgerStats {
            attempts,
            average_score: (attempts > 0).then(|| total_score / attempts as f64),
            best_score: self
                .entries
                .iter()
                .map(ProgressEntry::score)
                .reduce(f64::max),
            total_study_minutes: total_secs / 60.0,
            last_date: self.entries.last().map(ProgressEntry::date),
        }
    }
}
