use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PredictionAnswer {
    pub id: i64,
    pub user_id: String,
    pub question_id: i64,
    pub predicted_answer: String,
    pub actual_answer: Option<String>,
    pub is_correct: Option<bool>,
    pub verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl PredictionAnswer {
    pub fn is_verified(&self) -> bool {
        self.verified_at.is_some()
    }
}

/// Externally produced correctness judgment for one predicted text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub predicted_answer: String,
    pub is_correct: bool,
    /// Narrows the verdict to a single participant when present.
    #[serde(default)]
    pub user_id: Option<String>,
}
