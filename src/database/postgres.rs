use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::database::repository::{
    AnswerRepository, AttemptRepository, EventRepository, PredictionRepository,
    QuestionRepository, UserRepository,
};
use crate::error::{Error, Result};
use crate::models::answer::{Answer, NewAnswer};
use crate::models::attempt::{AttemptStatus, LeaderboardEntry};
use crate::models::event::{Event, NewEvent};
use crate::models::prediction::{PredictionAnswer, Verdict};
use crate::models::question::{NewQuestion, Question, QuestionContent, QuestionRow};
use crate::models::user::User;

const QUESTION_COLUMNS: &str = r#"
    id, event_id, body, option_a, option_b, option_c, option_d, correct_option,
    pool_group, category, version, base_lineage_id, is_active, valid_from,
    valid_until, deprecated_at, superseded_by, change_reason, created_at
"#;

const EVENT_COLUMNS: &str = r#"
    id, name, description, starts_at, ends_at, questions_per_user, is_active, created_at
"#;

const PREDICTION_COLUMNS: &str = r#"
    id, user_id, question_id, predicted_answer, actual_answer, is_correct, verified_at, created_at
"#;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn to_questions(rows: Vec<QuestionRow>) -> Result<Vec<Question>> {
    rows.into_iter().map(Question::try_from).collect()
}

#[async_trait]
impl UserRepository for PgStore {
    async fn upsert_user(&self, id: &str, name: &str, now: DateTime<Utc>) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, name, created_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name
            RETURNING id, name, created_at
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    async fn get_user(&self, id: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(r#"SELECT id, name, created_at FROM users WHERE id = $1"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }
}

#[async_trait]
impl EventRepository for PgStore {
    async fn create_event(&self, event: NewEvent, now: DateTime<Utc>) -> Result<Event> {
        let sql = format!(
            r#"
            INSERT INTO events (name, description, starts_at, ends_at, questions_per_user, is_active, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {EVENT_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, Event>(&sql)
            .bind(event.name)
            .bind(event.description)
            .bind(event.starts_at)
            .bind(event.ends_at)
            .bind(event.questions_per_user)
            .bind(event.is_active)
            .bind(now)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn get_event(&self, id: i64) -> Result<Option<Event>> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1");
        let row = sqlx::query_as::<_, Event>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn current_event(&self, now: DateTime<Utc>) -> Result<Option<Event>> {
        let sql = format!(
            r#"
            SELECT {EVENT_COLUMNS} FROM events
            WHERE is_active AND starts_at <= $1 AND ends_at > $1
            ORDER BY created_at DESC, id DESC
            LIMIT 1
            "#
        );
        let row = sqlx::query_as::<_, Event>(&sql)
            .bind(now)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }
}

#[async_trait]
impl QuestionRepository for PgStore {
    async fn insert_root(&self, question: NewQuestion, now: DateTime<Utc>) -> Result<Question> {
        // The id is drawn up front so the root can point at itself in one statement.
        let sql = format!(
            r#"
            WITH next AS (SELECT nextval(pg_get_serial_sequence('questions', 'id')) AS id)
            INSERT INTO questions (
                id, event_id, body, option_a, option_b, option_c, option_d, correct_option,
                pool_group, category, version, base_lineage_id, is_active, valid_from, created_at
            )
            SELECT next.id, $1, $2, $3, $4, $5, $6, $7, $8, $9, 1, next.id, TRUE, $10, $10
            FROM next
            RETURNING {QUESTION_COLUMNS}
            "#
        );
        let content = question.content;
        let row = sqlx::query_as::<_, QuestionRow>(&sql)
            .bind(question.event_id)
            .bind(content.body)
            .bind(content.options.a)
            .bind(content.options.b)
            .bind(content.options.c)
            .bind(content.options.d)
            .bind(content.correct_option.as_str())
            .bind(question.pool_group)
            .bind(content.category)
            .bind(now)
            .fetch_one(&self.pool)
            .await?;
        Question::try_from(row)
    }

    async fn get_question(&self, id: i64) -> Result<Option<Question>> {
        let sql = format!("SELECT {QUESTION_COLUMNS} FROM questions WHERE id = $1");
        let row = sqlx::query_as::<_, QuestionRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Question::try_from).transpose()
    }

    async fn supersede(
        &self,
        id: i64,
        content: QuestionContent,
        pool_group: Option<i16>,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Question> {
        let mut tx = self.pool.begin().await?;

        // Conditional deactivation doubles as the row lock: a concurrent
        // supersede of the same head finds nothing to update.
        let deactivate = format!(
            r#"
            UPDATE questions
            SET is_active = FALSE, deprecated_at = $2, valid_until = $2
            WHERE id = $1 AND is_active AND superseded_by IS NULL
            RETURNING {QUESTION_COLUMNS}
            "#
        );
        let target = sqlx::query_as::<_, QuestionRow>(&deactivate)
            .bind(id)
            .bind(now)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(target) = target else {
            let exists: bool =
                sqlx::query_scalar(r#"SELECT EXISTS(SELECT 1 FROM questions WHERE id = $1)"#)
                    .bind(id)
                    .fetch_one(&mut *tx)
                    .await?;
            tx.rollback().await?;
            return Err(if exists {
                Error::Conflict(format!("Question {} has already been superseded", id))
            } else {
                Error::NotFound(format!("Question {} not found", id))
            });
        };

        let insert = format!(
            r#"
            INSERT INTO questions (
                event_id, body, option_a, option_b, option_c, option_d, correct_option,
                pool_group, category, version, base_lineage_id, is_active, valid_from,
                change_reason, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, TRUE, $12, $13, $12)
            RETURNING {QUESTION_COLUMNS}
            "#
        );
        let successor = sqlx::query_as::<_, QuestionRow>(&insert)
            .bind(target.event_id)
            .bind(content.body)
            .bind(content.options.a)
            .bind(content.options.b)
            .bind(content.options.c)
            .bind(content.options.d)
            .bind(content.correct_option.as_str())
            .bind(pool_group.unwrap_or(target.pool_group))
            .bind(content.category)
            .bind(target.version + 1)
            .bind(target.base_lineage_id)
            .bind(now)
            .bind(reason)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query(r#"UPDATE questions SET superseded_by = $2 WHERE id = $1"#)
            .bind(target.id)
            .bind(successor.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Question::try_from(successor)
    }

    async fn list_lineage(&self, root_id: i64) -> Result<Vec<Question>> {
        let sql = format!(
            "SELECT {QUESTION_COLUMNS} FROM questions WHERE base_lineage_id = $1 ORDER BY version DESC"
        );
        let rows = sqlx::query_as::<_, QuestionRow>(&sql)
            .bind(root_id)
            .fetch_all(&self.pool)
            .await?;
        to_questions(rows)
    }

    async fn list_active_in_pool(&self, event_id: i64, pool_group: i16) -> Result<Vec<Question>> {
        let sql = format!(
            r#"
            SELECT {QUESTION_COLUMNS} FROM questions
            WHERE event_id = $1 AND pool_group = $2 AND is_active
            ORDER BY id
            "#
        );
        let rows = sqlx::query_as::<_, QuestionRow>(&sql)
            .bind(event_id)
            .bind(pool_group)
            .fetch_all(&self.pool)
            .await?;
        to_questions(rows)
    }

    async fn list_active_older_than(
        &self,
        cutoff: DateTime<Utc>,
        exempt_categories: &[String],
    ) -> Result<Vec<Question>> {
        let sql = format!(
            r#"
            SELECT {QUESTION_COLUMNS} FROM questions
            WHERE is_active AND valid_from < $1 AND NOT (category = ANY($2))
            ORDER BY valid_from ASC, id ASC
            "#
        );
        let rows = sqlx::query_as::<_, QuestionRow>(&sql)
            .bind(cutoff)
            .bind(exempt_categories.to_vec())
            .fetch_all(&self.pool)
            .await?;
        to_questions(rows)
    }
}

#[async_trait]
impl AnswerRepository for PgStore {
    async fn list_answers(&self, user_id: &str, event_id: i64) -> Result<Vec<Answer>> {
        let rows = sqlx::query_as::<_, Answer>(
            r#"
            SELECT id, user_id, event_id, question_id, chosen_option, is_correct,
                   time_spent_seconds, answered_at
            FROM answers
            WHERE user_id = $1 AND event_id = $2
            ORDER BY id
            "#,
        )
        .bind(user_id)
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

#[async_trait]
impl AttemptRepository for PgStore {
    async fn get_attempt(&self, user_id: &str, event_id: i64) -> Result<Option<AttemptStatus>> {
        let row = sqlx::query_as::<_, AttemptStatus>(
            r#"
            SELECT user_id, event_id, is_completed, score, completed_at
            FROM attempt_status
            WHERE user_id = $1 AND event_id = $2
            "#,
        )
        .bind(user_id)
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn commit_attempt(
        &self,
        attempt: AttemptStatus,
        answers: Vec<NewAnswer>,
    ) -> Result<Option<AttemptStatus>> {
        let mut tx = self.pool.begin().await?;

        // A second writer blocks on the primary key until the first commits,
        // then inserts nothing.
        let inserted = sqlx::query_as::<_, AttemptStatus>(
            r#"
            INSERT INTO attempt_status (user_id, event_id, is_completed, score, completed_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id, event_id) DO NOTHING
            RETURNING user_id, event_id, is_completed, score, completed_at
            "#,
        )
        .bind(&attempt.user_id)
        .bind(attempt.event_id)
        .bind(attempt.is_completed)
        .bind(attempt.score)
        .bind(attempt.completed_at)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(stored) = inserted else {
            tx.rollback().await?;
            return Ok(None);
        };

        for answer in answers {
            sqlx::query(
                r#"
                INSERT INTO answers (user_id, event_id, question_id, chosen_option, is_correct, time_spent_seconds, answered_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(&stored.user_id)
            .bind(stored.event_id)
            .bind(answer.question_id)
            .bind(answer.chosen_option)
            .bind(answer.is_correct)
            .bind(answer.time_spent_seconds)
            .bind(stored.completed_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(Some(stored))
    }

    async fn leaderboard(&self, event_id: i64, limit: i64) -> Result<Vec<LeaderboardEntry>> {
        let rows = sqlx::query_as::<_, LeaderboardEntry>(
            r#"
            SELECT a.user_id, COALESCE(u.name, a.user_id) AS name, a.score, a.completed_at
            FROM attempt_status a
            LEFT JOIN users u ON u.id = a.user_id
            WHERE a.event_id = $1 AND a.is_completed
            ORDER BY a.score DESC, a.completed_at ASC, a.user_id ASC
            LIMIT $2
            "#,
        )
        .bind(event_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn count_ahead(
        &self,
        event_id: i64,
        score: i32,
        completed_at: DateTime<Utc>,
    ) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM attempt_status
            WHERE event_id = $1 AND is_completed
              AND (score > $2 OR (score = $2 AND completed_at < $3))
            "#,
        )
        .bind(event_id)
        .bind(score)
        .bind(completed_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}

#[async_trait]
impl PredictionRepository for PgStore {
    async fn insert_prediction(
        &self,
        user_id: &str,
        question_id: i64,
        predicted_answer: &str,
        now: DateTime<Utc>,
    ) -> Result<PredictionAnswer> {
        let sql = format!(
            r#"
            INSERT INTO prediction_answers (user_id, question_id, predicted_answer, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING {PREDICTION_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, PredictionAnswer>(&sql)
            .bind(user_id)
            .bind(question_id)
            .bind(predicted_answer)
            .bind(now)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn list_predictions(&self, question_id: i64) -> Result<Vec<PredictionAnswer>> {
        let sql = format!(
            "SELECT {PREDICTION_COLUMNS} FROM prediction_answers WHERE question_id = $1 ORDER BY id"
        );
        let rows = sqlx::query_as::<_, PredictionAnswer>(&sql)
            .bind(question_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn apply_verdict(
        &self,
        question_id: i64,
        actual_answer: &str,
        verdict: &Verdict,
        now: DateTime<Utc>,
    ) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE prediction_answers
            SET actual_answer = $3, is_correct = $4, verified_at = $5
            WHERE question_id = $1
              AND predicted_answer = $2
              AND verified_at IS NULL
              AND ($6::text IS NULL OR user_id = $6)
            "#,
        )
        .bind(question_id)
        .bind(&verdict.predicted_answer)
        .bind(actual_answer)
        .bind(verdict.is_correct)
        .bind(now)
        .bind(verdict.user_id.as_deref())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
