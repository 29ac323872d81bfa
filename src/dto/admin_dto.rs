use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::Result;
use crate::models::event::NewEvent;
use crate::models::prediction::Verdict;
use crate::models::question::{QuestionContent, QuestionOptions};

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateEventRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub description: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    #[validate(range(min = 1, max = 500))]
    pub questions_per_user: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl From<CreateEventRequest> for NewEvent {
    fn from(req: CreateEventRequest) -> Self {
        Self {
            name: req.name,
            description: req.description,
            starts_at: req.starts_at,
            ends_at: req.ends_at,
            questions_per_user: req.questions_per_user,
            is_active: req.is_active,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OptionsPayload {
    #[validate(length(min = 1, max = 500))]
    pub a: String,
    #[validate(length(min = 1, max = 500))]
    pub b: String,
    #[validate(length(min = 1, max = 500))]
    pub c: String,
    #[validate(length(min = 1, max = 500))]
    pub d: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct QuestionContentPayload {
    #[validate(length(min = 1, max = 2000))]
    pub body: String,
    #[validate(nested)]
    pub options: OptionsPayload,
    #[validate(custom(function = "crate::utils::validation::option_label"))]
    pub correct_option: String,
    #[validate(length(min = 1, max = 100))]
    pub category: String,
}

impl QuestionContentPayload {
    pub fn into_content(self) -> Result<QuestionContent> {
        Ok(QuestionContent {
            body: self.body,
            options: QuestionOptions {
                a: self.options.a,
                b: self.options.b,
                c: self.options.c,
                d: self.options.d,
            },
            correct_option: self.correct_option.parse()?,
            category: self.category,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateQuestionRequest {
    #[validate(range(min = 1))]
    pub event_id: i64,
    #[validate(range(min = 0, max = 9))]
    pub pool_group: i16,
    #[serde(flatten)]
    #[validate(nested)]
    pub content: QuestionContentPayload,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SupersedeQuestionRequest {
    #[serde(flatten)]
    #[validate(nested)]
    pub content: QuestionContentPayload,
    #[validate(range(min = 0, max = 9))]
    pub pool_group: Option<i16>,
    #[validate(length(max = 500))]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupersedeResponse {
    pub previous_id: i64,
    pub question_id: i64,
    pub version: i32,
    pub base_lineage_id: i64,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct OutdatedQuery {
    #[validate(range(min = 1, max = 3650))]
    pub max_age_days: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct VerdictPayload {
    #[validate(length(min = 1, max = 500))]
    pub predicted_answer: String,
    pub is_correct: bool,
    #[validate(length(min = 1, max = 64))]
    pub user_id: Option<String>,
}

impl From<VerdictPayload> for Verdict {
    fn from(v: VerdictPayload) -> Self {
        Self {
            predicted_answer: v.predicted_answer,
            is_correct: v.is_correct,
            user_id: v.user_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ReconcileRequest {
    #[validate(length(min = 1, max = 500))]
    pub actual_answer: String,
    #[validate(nested)]
    pub verdicts: Vec<VerdictPayload>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileResponse {
    pub question_id: i64,
    pub reconciled: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct JudgeRequest {
    #[validate(length(min = 1, max = 500))]
    pub actual_answer: String,
}
