use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Append-only audit record of one submitted answer.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Answer {
    pub id: i64,
    pub user_id: String,
    pub event_id: i64,
    pub question_id: i64,
    pub chosen_option: String,
    pub is_correct: bool,
    pub time_spent_seconds: i32,
    pub answered_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewAnswer {
    pub question_id: i64,
    pub chosen_option: String,
    pub is_correct: bool,
    pub time_spent_seconds: i32,
}
