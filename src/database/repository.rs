//! Narrow storage contracts, one per entity.
//!
//! Services depend on these traits only. `PgStore` backs them with
//! PostgreSQL; `MemoryStore` keeps everything in process for tests and
//! local runs. Both must honour the same atomicity rules, in particular the
//! insert-if-absent contract of [`AttemptRepository::commit_attempt`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::answer::{Answer, NewAnswer};
use crate::models::attempt::{AttemptStatus, LeaderboardEntry};
use crate::models::event::{Event, NewEvent};
use crate::models::prediction::{PredictionAnswer, Verdict};
use crate::models::question::{NewQuestion, Question, QuestionContent};
use crate::models::user::User;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Creates the user on first contact; later calls refresh the display name.
    async fn upsert_user(&self, id: &str, name: &str, now: DateTime<Utc>) -> Result<User>;

    async fn get_user(&self, id: &str) -> Result<Option<User>>;
}

#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn create_event(&self, event: NewEvent, now: DateTime<Utc>) -> Result<Event>;

    async fn get_event(&self, id: i64) -> Result<Option<Event>>;

    /// Most recently created event that is active and whose window contains `now`.
    async fn current_event(&self, now: DateTime<Utc>) -> Result<Option<Event>>;
}

#[async_trait]
pub trait QuestionRepository: Send + Sync {
    /// Inserts a lineage root: version 1, `base_lineage_id` equal to its own id.
    async fn insert_root(&self, question: NewQuestion, now: DateTime<Utc>) -> Result<Question>;

    async fn get_question(&self, id: i64) -> Result<Option<Question>>;

    /// Deactivates `id` and appends its successor as one unit.
    ///
    /// Fails with `NotFound` when `id` does not exist and with `Conflict`
    /// when `id` is no longer the active head of its lineage.
    async fn supersede(
        &self,
        id: i64,
        content: QuestionContent,
        pool_group: Option<i16>,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Question>;

    /// Every record sharing `root_id`, version descending.
    async fn list_lineage(&self, root_id: i64) -> Result<Vec<Question>>;

    async fn list_active_in_pool(&self, event_id: i64, pool_group: i16) -> Result<Vec<Question>>;

    /// Active questions outside `exempt_categories` with `valid_from < cutoff`,
    /// oldest first.
    async fn list_active_older_than(
        &self,
        cutoff: DateTime<Utc>,
        exempt_categories: &[String],
    ) -> Result<Vec<Question>>;
}

#[async_trait]
pub trait AnswerRepository: Send + Sync {
    async fn list_answers(&self, user_id: &str, event_id: i64) -> Result<Vec<Answer>>;
}

#[async_trait]
pub trait AttemptRepository: Send + Sync {
    async fn get_attempt(&self, user_id: &str, event_id: i64) -> Result<Option<AttemptStatus>>;

    /// Writes the attempt row and its answers only if no attempt exists yet
    /// for `(user_id, event_id)`.
    ///
    /// Returns `None` when another writer got there first; in that case
    /// nothing from this call is persisted.
    async fn commit_attempt(
        &self,
        attempt: AttemptStatus,
        answers: Vec<NewAnswer>,
    ) -> Result<Option<AttemptStatus>>;

    /// Completed attempts by score descending, earlier completion first on ties.
    async fn leaderboard(&self, event_id: i64, limit: i64) -> Result<Vec<LeaderboardEntry>>;

    /// Completed attempts ranked strictly ahead of `(score, completed_at)`.
    async fn count_ahead(
        &self,
        event_id: i64,
        score: i32,
        completed_at: DateTime<Utc>,
    ) -> Result<i64>;
}

#[async_trait]
pub trait PredictionRepository: Send + Sync {
    async fn insert_prediction(
        &self,
        user_id: &str,
        question_id: i64,
        predicted_answer: &str,
        now: DateTime<Utc>,
    ) -> Result<PredictionAnswer>;

    async fn list_predictions(&self, question_id: i64) -> Result<Vec<PredictionAnswer>>;

    /// Marks every unverified prediction for `question_id` whose text equals
    /// the verdict text (and user, when the verdict names one). Returns the
    /// number of rows updated.
    async fn apply_verdict(
        &self,
        question_id: i64,
        actual_answer: &str,
        verdict: &Verdict,
        now: DateTime<Utc>,
    ) -> Result<u64>;
}

/// Everything the application needs from a backing store.
pub trait Store:
    UserRepository
    + EventRepository
    + QuestionRepository
    + AnswerRepository
    + AttemptRepository
    + PredictionRepository
{
}

impl<T> Store for T where
    T: UserRepository
        + EventRepository
        + QuestionRepository
        + AnswerRepository
        + AttemptRepository
        + PredictionRepository
{
}
