use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::database::repository::{EventRepository, QuestionRepository};
use crate::error::{Error, Result};
use crate::models::question::{PublicQuestion, Question};
use crate::services::participation_service::ParticipationService;
use crate::services::pool_service::assign_pool;

#[derive(Clone)]
pub struct SelectionService {
    questions: Arc<dyn QuestionRepository>,
    events: Arc<dyn EventRepository>,
    participation: ParticipationService,
}

impl SelectionService {
    pub fn new(
        questions: Arc<dyn QuestionRepository>,
        events: Arc<dyn EventRepository>,
        participation: ParticipationService,
    ) -> Self {
        Self {
            questions,
            events,
            participation,
        }
    }

    /// Uniform sample without replacement of at most `limit` active
    /// questions from one pool. Under-filled pools return everything they have.
    pub async fn select(
        &self,
        event_id: i64,
        pool_group: i16,
        limit: usize,
    ) -> Result<Vec<PublicQuestion>> {
        let eligible = self.questions.list_active_in_pool(event_id, pool_group).await?;
        Ok(sample(&eligible, limit, &mut rand::thread_rng()))
    }

    /// Selection for a participant: the event must exist, the user must not
    /// have completed it, and the pool defaults to the user's own shard.
    pub async fn select_for_user(
        &self,
        user_id: &str,
        event_id: i64,
        pool_group: Option<i16>,
    ) -> Result<Vec<PublicQuestion>> {
        let event = self
            .events
            .get_event(event_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Event {} not found", event_id)))?;
        self.participation
            .ensure_not_completed(user_id, event_id)
            .await?;

        let pool = pool_group.unwrap_or_else(|| assign_pool(user_id));
        let limit = usize::try_from(event.questions_per_user).unwrap_or(0);
        let selected = self.select(event.id, pool, limit).await?;
        tracing::info!(
            user_id,
            event_id,
            pool_group = pool,
            selected = selected.len(),
            "questions selected"
        );
        Ok(selected)
    }
}

pub fn sample<R: Rng + ?Sized>(questions: &[Question], limit: usize, rng: &mut R) -> Vec<PublicQuestion> {
    questions
        .choose_multiple(rng, limit)
        .map(PublicQuestion::from)
        .collect()
}
