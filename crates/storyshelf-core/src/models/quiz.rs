use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A quiz question the user bookmarked for review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct QuizBookmark {
    pub quiz_id: i64,
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub options: Vec<String>,
    pub bookmarked_at: DateTime<Utc>,
}

impl QuizBookmark {
    pub fn new(quiz_id: i64, question: impl Into<String>, options: Vec<String>) -> Self {
        Self {
            quiz_id,
            question: question.into(),
            options,
            bookmarked_at: Utc::now(),
        }
    }
}
