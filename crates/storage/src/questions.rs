//! Reader for the external question collection.
//!
//! The file is a JSON object with a `questions` array. Inside a record, missing or
//! wrongly typed fields fall back to empty values, and entries that are not objects
//! read as empty records, so one sloppy record does not hide the rest. Such records
//! are rejected later, when they are turned into domain questions. A file whose
//! top level is not that shape is still a parse error.

use std::path::Path;

use quiz_core::model::QuestionDraft;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::repository::StorageError;

/// Persisted shape of a single question.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QuestionRecord {
    #[serde(default, deserialize_with = "lenient")]
    pub topic: String,
    #[serde(default, deserialize_with = "lenient_difficulty")]
    pub difficulty: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub question: String,
    #[serde(default, deserialize_with = "lenient")]
    pub options: Vec<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub correct_answer: String,
    #[serde(default, deserialize_with = "lenient")]
    pub explanation: Option<String>,
}

/// A value of the wrong type reads as the field's default.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

/// Non-string difficulties keep their JSON text so they are reported as unknown
/// rather than read as the `medium` default.
fn lenient_difficulty<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    })
}

fn lenient_records<'de, D>(deserializer: D) -> Result<Vec<QuestionRecord>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Vec::<Value>::deserialize(deserializer)?;
    Ok(values
        .into_iter()
        .map(|value| QuestionRecord::deserialize(value).unwrap_or_default())
        .collect())
}

impl QuestionRecord {
    /// Difficulty as written in the source; absent values read as `medium`.
    #[must_use]
    pub fn raw_difficulty(&self) -> &str {
        self.difficulty.as_deref().unwrap_or("medium")
    }

    #[must_use]
    pub fn into_draft(self) -> QuestionDraft {
        QuestionDraft {
            topic: self.topic.trim().to_string(),
            text: self.question,
            options: self.options,
            correct_answer: self.correct_answer,
            explanation: self.explanation,
        }
    }
}

/// Top-level question file.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QuestionFile {
    #[serde(default, deserialize_with = "lenient_records")]
    pub questions: Vec<QuestionRecord>,
}

/// Parse a question collection from JSON text.
///
/// # Errors
///
/// Returns `StorageError::Serialization` if the text is not a valid collection.
pub fn parse_question_file(raw: &str) -> Result<QuestionFile, StorageError> {
    serde_json::from_str(raw).map_err(|e| StorageError::Serialization(e.to_string()))
}

/// Read and parse a question collection from disk.
///
/// # Errors
///
/// Returns `StorageError::NotFound` if the file is missing, `StorageError::Io` for
/// other read failures, and `StorageError::Serialization` if parsing fails.
pub async fn read_question_file(path: &Path) -> Result<QuestionFile, StorageError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| StorageError::from_io(&e))?;
    parse_question_file(&raw)
}
