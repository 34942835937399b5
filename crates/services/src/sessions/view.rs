//! Presentation helpers shared by front ends.
//!
//! These return plain strings or numbers; no terminal or widget assumptions.

use quiz_core::model::ProgressEntry;

/// Format seconds as `MM:SS`, truncating fractions.
///
/// Minutes are not wrapped into hours, so 3725 seconds is `62:05`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn format_clock(secs: f64) -> String {
    let whole = if secs.is_finite() && secs > 0.0 {
        secs.trunc() as u64
    } else {
        0
    };
    format!("{:02}:{:02}", whole / 60, whole % 60)
}

/// Score ratio as a whole percentage, e.g. `0.6` becomes `60%`.
#[must_use]
pub fn format_percent(ratio: f64) -> String {
    format!("{:.0}%", ratio * 100.0)
}

/// One row of the attempt history table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRow {
    pub attempt: u32,
    pub date: String,
    pub score: String,
    pub time_spent: String,
}

impl HistoryRow {
    #[must_use]
    pub fn from_entry(entry: &ProgressEntry) -> Self {
        Self {
            attempt: entry.attempt(),
            date: entry.date().format("%Y-%m-%d").to_string(),
            score: format_percent(entry.score()),
            time_spent: format_clock(entry.time_spent_secs()),
        }
    }
}
