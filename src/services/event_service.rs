use std::sync::Arc;

use crate::database::repository::{EventRepository, UserRepository};
use crate::error::{Error, Result};
use crate::models::event::{Event, NewEvent};
use crate::models::user::User;
use crate::services::pool_service::assign_pool;
use crate::utils::time::now;

#[derive(Clone)]
pub struct EventService {
    events: Arc<dyn EventRepository>,
    users: Arc<dyn UserRepository>,
}

/// A participant's entry point: who they are, which event is running and
/// which pool they draw from.
#[derive(Debug, Clone)]
pub struct CheckIn {
    pub user: User,
    pub event: Event,
    pub pool_group: i16,
}

impl EventService {
    pub fn new(events: Arc<dyn EventRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { events, users }
    }

    pub async fn create_event(&self, event: NewEvent) -> Result<Event> {
        if event.starts_at >= event.ends_at {
            return Err(Error::Validation(
                "Event must start before it ends".to_string(),
            ));
        }
        if event.questions_per_user < 1 {
            return Err(Error::Validation(
                "questions_per_user must be at least 1".to_string(),
            ));
        }
        let created = self.events.create_event(event, now()).await?;
        tracing::info!(event_id = created.id, name = %created.name, "event created");
        Ok(created)
    }

    pub async fn current_event(&self) -> Result<Event> {
        self.events
            .current_event(now())
            .await?
            .ok_or_else(|| Error::NotFound("No active event".to_string()))
    }

    /// Registers the user on first contact and resolves the current event
    /// and their pool.
    pub async fn check_in(&self, user_id: &str, name: &str) -> Result<CheckIn> {
        let user = self.users.upsert_user(user_id, name, now()).await?;
        let event = self.current_event().await?;
        Ok(CheckIn {
            pool_group: assign_pool(&user.id),
            user,
            event,
        })
    }
}
