use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One user's single permitted participation in one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct AttemptStatus {
    pub user_id: String,
    pub event_id: i64,
    pub is_completed: bool,
    pub score: i32,
    pub completed_at: DateTime<Utc>,
}

/// Completed attempt joined with the participant's display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct LeaderboardEntry {
    pub user_id: String,
    pub name: String,
    pub score: i32,
    pub completed_at: DateTime<Utc>,
}
