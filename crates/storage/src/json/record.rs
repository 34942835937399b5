use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use quiz_core::model::{ProgressEntry, ProgressLedger};
use serde::{Deserialize, Serialize};

use crate::repository::StorageError;

const DATE_FORMAT: &str = "%Y-%m-%d";
const NAIVE_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

/// On-disk progress file.
///
/// Entries are stored column-wise: `attempts`, `scores`, `time_spent` and `dates`
/// are parallel arrays correlated by position. `average_time` is optional and
/// files written without it still load.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProgressRecord {
    #[serde(default)]
    pub attempts: Vec<u32>,
    #[serde(default)]
    pub scores: Vec<f64>,
    #[serde(default)]
    pub time_spent: Vec<f64>,
    #[serde(default)]
    pub dates: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub average_time: Vec<f64>,
    #[serde(default)]
    pub registration_clicks: u64,
    #[serde(default)]
    pub last_registration_click: Option<String>,
}

impl ProgressRecord {
    #[must_use]
    pub fn from_ledger(ledger: &ProgressLedger) -> Self {
        let entries = ledger.entries();
        let average_time = if entries.iter().all(|e| e.average_secs().is_some()) {
            entries.iter().filter_map(ProgressEntry::average_secs).collect()
        } else {
            Vec::new()
        };

        Self {
            attempts: entries.iter().map(ProgressEntry::attempt).collect(),
            scores: entries.iter().map(ProgressEntry::score).collect(),
            time_spent: entries.iter().map(ProgressEntry::time_spent_secs).collect(),
            dates: entries
                .iter()
                .map(|e| e.date().format(DATE_FORMAT).to_string())
                .collect(),
            average_time,
            registration_clicks: ledger.registration_clicks(),
            last_registration_click: ledger.last_registration_click().map(|t| t.to_rfc3339()),
        }
    }

    /// Convert the columns back into a domain ledger.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the parallel arrays differ in
    /// length, a date or timestamp cannot be parsed, or an entry is invalid.
    pub fn into_ledger(self) -> Result<ProgressLedger, StorageError> {
        let len = self.attempts.len();
        if self.scores.len() != len || self.time_spent.len() != len || self.dates.len() != len {
            return Err(StorageError::Serialization(format!(
                "parallel arrays differ in length: attempts={len}, scores={}, time_spent={}, dates={}",
                self.scores.len(),
                self.time_spent.len(),
                self.dates.len()
            )));
        }
        let has_average = self.average_time.len() == len;

        let mut entries = Vec::with_capacity(len);
        for i in 0..len {
            let date = NaiveDate::parse_from_str(&self.dates[i], DATE_FORMAT).map_err(ser)?;
            let average = has_average.then(|| self.average_time[i]);
            let entry = ProgressEntry::from_persisted(
                self.attempts[i],
                self.scores[i],
                self.time_spent[i],
                average,
                date,
            )
            .map_err(ser)?;
            entries.push(entry);
        }

        let last_click = self
            .last_registration_click
            .as_deref()
            .map(parse_timestamp)
            .transpose()?;

        ProgressLedger::from_persisted(entries, self.registration_clicks, last_click).map_err(ser)
    }
}

/// RFC 3339, or a naive ISO timestamp which is taken as UTC.
pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, StorageError> {
    if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
        return Ok(t.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, NAIVE_TIMESTAMP_FORMAT)
        .map(|t| t.and_utc())
        .map_err(|e| StorageError::Serialization(format!("invalid timestamp {raw:?}: {e}")))
}
