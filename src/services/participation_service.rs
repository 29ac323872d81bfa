use std::sync::Arc;

use crate::database::repository::AttemptRepository;
use crate::error::{Error, Result};
use crate::models::answer::NewAnswer;
use crate::models::attempt::AttemptStatus;
use crate::utils::time::now;

/// Enforces at most one completed attempt per (user, event).
///
/// The early `has_completed` read only gives a fast, friendly rejection. The
/// authoritative check is the insert-if-absent inside `commit`, so two
/// racing submissions can never both be recorded.
#[derive(Clone)]
pub struct ParticipationService {
    attempts: Arc<dyn AttemptRepository>,
}

impl ParticipationService {
    pub fn new(attempts: Arc<dyn AttemptRepository>) -> Self {
        Self { attempts }
    }

    pub async fn has_completed(&self, user_id: &str, event_id: i64) -> Result<bool> {
        let attempt = self.attempts.get_attempt(user_id, event_id).await?;
        Ok(attempt.map_or(false, |a| a.is_completed))
    }

    pub async fn ensure_not_completed(&self, user_id: &str, event_id: i64) -> Result<()> {
        if self.has_completed(user_id, event_id).await? {
            tracing::warn!(user_id, event_id, "attempt already completed");
            return Err(already_completed(user_id, event_id));
        }
        Ok(())
    }

    pub async fn get_attempt(&self, user_id: &str, event_id: i64) -> Result<Option<AttemptStatus>> {
        self.attempts.get_attempt(user_id, event_id).await
    }

    /// Records a completed attempt with no answer rows.
    pub async fn record_completion(
        &self,
        user_id: &str,
        event_id: i64,
        score: i32,
    ) -> Result<AttemptStatus> {
        self.commit(user_id, event_id, score, Vec::new()).await
    }

    /// Persists the completion row together with its answers, or nothing at
    /// all if the pair already has an attempt.
    pub async fn commit(
        &self,
        user_id: &str,
        event_id: i64,
        score: i32,
        answers: Vec<NewAnswer>,
    ) -> Result<AttemptStatus> {
        let attempt = AttemptStatus {
            user_id: user_id.to_string(),
            event_id,
            is_completed: true,
            score,
            completed_at: now(),
        };
        match self.attempts.commit_attempt(attempt, answers).await? {
            Some(stored) => Ok(stored),
            None => {
                tracing::warn!(user_id, event_id, "lost completion race");
                Err(already_completed(user_id, event_id))
            }
        }
    }
}

fn already_completed(user_id: &str, event_id: i64) -> Error {
    Error::Conflict(format!(
        "User {} has already completed event {}",
        user_id, event_id
    ))
}
