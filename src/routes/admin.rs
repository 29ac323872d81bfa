use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use chrono::Duration;

use crate::dto::admin_dto::{
    CreateEventRequest, CreateQuestionRequest, OutdatedQuery, SupersedeQuestionRequest,
    SupersedeResponse,
};
use crate::error::Result;
use crate::models::event::Event;
use crate::models::question::{NewQuestion, Question};
use crate::routes::extract::{ValidatedJson, ValidatedPath, ValidatedQuery};
use crate::AppState;

#[axum::debug_handler]
pub async fn create_event(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateEventRequest>,
) -> Result<(StatusCode, Json<Event>)> {
    let event = state.event_service.create_event(req.into()).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

#[axum::debug_handler]
pub async fn create_question(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateQuestionRequest>,
) -> Result<(StatusCode, Json<Question>)> {
    let question = state
        .question_service
        .create(NewQuestion {
            event_id: req.event_id,
            pool_group: req.pool_group,
            content: req.content.into_content()?,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(question)))
}

#[axum::debug_handler]
pub async fn supersede_question(
    State(state): State<AppState>,
    ValidatedPath(question_id): ValidatedPath<i64>,
    ValidatedJson(req): ValidatedJson<SupersedeQuestionRequest>,
) -> Result<(StatusCode, Json<SupersedeResponse>)> {
    let successor = state
        .question_service
        .supersede(
            question_id,
            req.content.into_content()?,
            req.pool_group,
            req.reason,
        )
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(SupersedeResponse {
            previous_id: question_id,
            question_id: successor.id,
            version: successor.version,
            base_lineage_id: successor.base_lineage_id,
        }),
    ))
}

#[axum::debug_handler]
pub async fn question_history(
    State(state): State<AppState>,
    ValidatedPath(question_id): ValidatedPath<i64>,
) -> Result<Json<Vec<Question>>> {
    Ok(Json(state.question_service.history(question_id).await?))
}

#[axum::debug_handler]
pub async fn question_head(
    State(state): State<AppState>,
    ValidatedPath(question_id): ValidatedPath<i64>,
) -> Result<Json<Question>> {
    Ok(Json(state.question_service.head(question_id).await?))
}

#[axum::debug_handler]
pub async fn outdated_questions(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<OutdatedQuery>,
) -> Result<Json<Vec<Question>>> {
    let max_age = query.max_age_days.map(Duration::days);
    Ok(Json(state.question_service.outdated(max_age).await?))
}
