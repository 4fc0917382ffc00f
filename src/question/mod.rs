//! Exam Questions
//!
//! Turns the question API response into [`Question`] values and renders a
//! question into the view HTML: header, formatted body and action buttons.

mod doc_label;
mod view;

pub use doc_label::doc_label;
pub use view::{render_question, render_question_with, RENDER_ERROR_BANNER};

use crate::error::{Error, Result};
use log::{debug, warn};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;

// ─────────────────────────────────────────────────────────────────────────────
// API Records
// ─────────────────────────────────────────────────────────────────────────────

/// Question identifier as the API sends it: a number or a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QuestionId {
    Number(serde_json::Number),
    Text(String),
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionId::Number(n) => write!(f, "{}", n),
            QuestionId::Text(s) => f.write_str(s),
        }
    }
}

/// Treat an explicit `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One entry of the API's `questions` array. Unknown keys are kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionRecord {
    pub id: QuestionId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub machine_hostname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub concepts: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub documentation: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Question
// ─────────────────────────────────────────────────────────────────────────────

/// A question as the view works with it.
#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    pub id: QuestionId,
    /// Raw question text, empty when the record has none
    pub content: String,
    pub title: String,
    pub original_data: QuestionRecord,
    pub flagged: bool,
}

impl Question {
    pub fn from_record(record: QuestionRecord) -> Self {
        Self {
            id: record.id.clone(),
            content: record.question.clone().unwrap_or_default(),
            title: format!("Question {}", record.id),
            original_data: record,
            flagged: false,
        }
    }

    /// Flip the review flag, returning the new state.
    pub fn toggle_flag(&mut self) -> bool {
        self.flagged = !self.flagged;
        self.flagged
    }
}

/// Map an API response to questions.
///
/// Returns an empty list unless `questions` is an array. Entries that are
/// not valid question records are skipped.
pub fn transform_questions(data: &Value) -> Vec<Question> {
    let Some(records) = data.get("questions").and_then(Value::as_array) else {
        debug!("Response has no questions array");
        return Vec::new();
    };

    records
        .iter()
        .enumerate()
        .filter_map(|(index, raw)| match QuestionRecord::deserialize(raw) {
            Ok(record) => Some(Question::from_record(record)),
            Err(e) => {
                warn!("Skipping question at index {}: {}", index, e);
                None
            }
        })
        .collect()
}

/// Parse an API response body and map it to questions.
pub fn parse_questions(json: &str) -> Result<Vec<Question>> {
    let data: Value = serde_json::from_str(json).map_err(Error::QuestionParse)?;
    Ok(transform_questions(&data))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
