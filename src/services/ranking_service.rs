use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::database::repository::AttemptRepository;
use crate::error::{Error, Result};
use crate::models::attempt::LeaderboardEntry;

pub const MAX_LEADERBOARD_LIMIT: i64 = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserResult {
    pub score: i32,
    pub completed_at: DateTime<Utc>,
    pub rank: u64,
}

/// Standings: higher score first, earlier completion wins ties.
#[derive(Clone)]
pub struct RankingService {
    attempts: Arc<dyn AttemptRepository>,
    default_limit: i64,
}

impl RankingService {
    pub fn new(attempts: Arc<dyn AttemptRepository>, default_limit: i64) -> Self {
        Self {
            attempts,
            default_limit: default_limit.clamp(1, MAX_LEADERBOARD_LIMIT),
        }
    }

    pub async fn leaderboard(&self, event_id: i64, limit: Option<i64>) -> Result<Vec<LeaderboardEntry>> {
        let limit = limit
            .unwrap_or(self.default_limit)
            .clamp(1, MAX_LEADERBOARD_LIMIT);
        self.attempts.leaderboard(event_id, limit).await
    }

    /// 1 + the number of completed attempts with a higher score, or the same
    /// score and an earlier completion.
    pub async fn rank_of(&self, user_id: &str, event_id: i64) -> Result<u64> {
        Ok(self.user_result(user_id, event_id).await?.rank)
    }

    pub async fn user_result(&self, user_id: &str, event_id: i64) -> Result<UserResult> {
        let attempt = self
            .attempts
            .get_attempt(user_id, event_id)
            .await?
            .filter(|a| a.is_completed)
            .ok_or_else(|| {
                Error::NotFound(format!(
                    "No completed attempt for user {} in event {}",
                    user_id, event_id
                ))
            })?;
        let ahead = self
            .attempts
            .count_ahead(event_id, attempt.score, attempt.completed_at)
            .await?;
        Ok(UserResult {
            score: attempt.score,
            completed_at: attempt.completed_at,
            rank: ahead.max(0) as u64 + 1,
        })
    }
}
