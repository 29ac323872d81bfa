use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::Result;
use crate::models::attempt::LeaderboardEntry;
use crate::models::event::Event;
use crate::models::question::PublicQuestion;
use crate::services::scoring_service::SubmittedAnswer;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventSummary {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub questions_per_user: i32,
}

impl From<Event> for EventSummary {
    fn from(e: Event) -> Self {
        Self {
            id: e.id,
            name: e.name,
            description: e.description,
            starts_at: e.starts_at,
            ends_at: e.ends_at,
            questions_per_user: e.questions_per_user,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentEventResponse {
    pub user_id: String,
    pub name: String,
    pub pool_group: i16,
    pub event: EventSummary,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SelectQuestionsQuery {
    #[validate(range(min = 0, max = 9))]
    pub pool_group: Option<i16>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionsResponse {
    pub event_id: i64,
    pub questions: Vec<PublicQuestion>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SubmitAnswerItem {
    #[validate(range(min = 1))]
    pub question_id: i64,
    #[validate(custom(function = "crate::utils::validation::option_label"))]
    pub chosen_option: String,
    #[serde(default)]
    #[validate(range(min = 0, max = 86400))]
    pub time_spent_seconds: i32,
}

impl SubmitAnswerItem {
    pub fn into_submitted(self) -> Result<SubmittedAnswer> {
        Ok(SubmittedAnswer {
            question_id: self.question_id,
            chosen_option: self.chosen_option.parse()?,
            time_spent_seconds: self.time_spent_seconds,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SubmitAnswersRequest {
    #[validate(length(min = 1, max = 500), nested)]
    pub answers: Vec<SubmitAnswerItem>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LeaderboardQuery {
    #[validate(range(min = 1, max = 1000))]
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardResponse {
    pub event_id: i64,
    pub entries: Vec<LeaderboardEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResultResponse {
    pub user_id: String,
    pub event_id: i64,
    pub score: i32,
    pub completed_at: DateTime<Utc>,
    pub rank: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreatePredictionRequest {
    #[validate(range(min = 1))]
    pub question_id: i64,
    #[validate(length(min = 1, max = 500))]
    pub predicted_answer: String,
}
