use std::sync::Arc;

use chrono::Duration;

use crate::database::repository::{EventRepository, QuestionRepository};
use crate::error::{Error, Result};
use crate::models::question::{NewQuestion, Question, QuestionContent};
use crate::utils::time::{months_before, now};

/// Default age after which an active question is flagged for review.
pub const DEFAULT_OUTDATED_MONTHS: u32 = 6;

/// Append-only version chains of questions.
///
/// A lineage is identified by the id of its root record. Editing a question
/// never touches its content: `supersede` retires the current head and
/// appends a successor, so answers keep pointing at the exact text they were
/// given against.
#[derive(Clone)]
pub struct QuestionService {
    questions: Arc<dyn QuestionRepository>,
    events: Arc<dyn EventRepository>,
    exempt_categories: Vec<String>,
}

impl QuestionService {
    pub fn new(
        questions: Arc<dyn QuestionRepository>,
        events: Arc<dyn EventRepository>,
        exempt_categories: Vec<String>,
    ) -> Self {
        Self {
            questions,
            events,
            exempt_categories,
        }
    }

    pub async fn create(&self, question: NewQuestion) -> Result<Question> {
        if self.events.get_event(question.event_id).await?.is_none() {
            return Err(Error::NotFound(format!(
                "Event {} not found",
                question.event_id
            )));
        }
        let created = self.questions.insert_root(question, now()).await?;
        tracing::info!(
            question_id = created.id,
            event_id = created.event_id,
            pool_group = created.pool_group,
            "question lineage created"
        );
        Ok(created)
    }

    pub async fn get(&self, id: i64) -> Result<Question> {
        self.questions
            .get_question(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Question {} not found", id)))
    }

    pub async fn supersede(
        &self,
        id: i64,
        content: QuestionContent,
        pool_group: Option<i16>,
        reason: Option<String>,
    ) -> Result<Question> {
        let successor = self
            .questions
            .supersede(id, content, pool_group, reason, now())
            .await?;
        tracing::info!(
            previous_id = id,
            question_id = successor.id,
            lineage = successor.base_lineage_id,
            version = successor.version,
            "question superseded"
        );
        Ok(successor)
    }

    /// All versions of the lineage `id` belongs to, newest first. Unknown ids
    /// have no history.
    pub async fn history(&self, id: i64) -> Result<Vec<Question>> {
        let Some(question) = self.questions.get_question(id).await? else {
            return Ok(Vec::new());
        };
        self.questions.list_lineage(question.base_lineage_id).await
    }

    /// Follows forward pointers from `id` to the current version.
    pub async fn head(&self, id: i64) -> Result<Question> {
        let mut current = self.get(id).await?;
        while let Some(next) = current.superseded_by {
            current = self.get(next).await?;
        }
        Ok(current)
    }

    /// Active, non-exempt questions whose current version went live before
    /// `now - max_age` (six calendar months when unspecified), oldest first.
    pub async fn outdated(&self, max_age: Option<Duration>) -> Result<Vec<Question>> {
        let now = now();
        let cutoff = match max_age {
            Some(age) => now - age,
            None => months_before(now, DEFAULT_OUTDATED_MONTHS),
        };
        self.questions
            .list_active_older_than(cutoff, &self.exempt_categories)
            .await
    }
}
