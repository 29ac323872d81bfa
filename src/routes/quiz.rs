use axum::{
    extract::State,
    response::Json,
    Extension,
};

use crate::dto::quiz_dto::{
    CurrentEventResponse, LeaderboardQuery, LeaderboardResponse, QuestionsResponse,
    SelectQuestionsQuery, SubmitAnswersRequest, UserResultResponse,
};
use crate::error::Result;
use crate::middleware::auth::Claims;
use crate::routes::extract::{ValidatedJson, ValidatedPath, ValidatedQuery};
use crate::services::scoring_service::SubmissionResult;
use crate::AppState;

#[axum::debug_handler]
pub async fn current_event(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<CurrentEventResponse>> {
    let check_in = state
        .event_service
        .check_in(claims.user_id(), claims.display_name())
        .await?;
    Ok(Json(CurrentEventResponse {
        user_id: check_in.user.id,
        name: check_in.user.name,
        pool_group: check_in.pool_group,
        event: check_in.event.into(),
    }))
}

#[axum::debug_handler]
pub async fn select_questions(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ValidatedPath(event_id): ValidatedPath<i64>,
    ValidatedQuery(query): ValidatedQuery<SelectQuestionsQuery>,
) -> Result<Json<QuestionsResponse>> {
    let questions = state
        .selection_service
        .select_for_user(claims.user_id(), event_id, query.pool_group)
        .await?;
    Ok(Json(QuestionsResponse {
        event_id,
        questions,
    }))
}

#[axum::debug_handler]
pub async fn submit_answers(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ValidatedPath(event_id): ValidatedPath<i64>,
    ValidatedJson(req): ValidatedJson<SubmitAnswersRequest>,
) -> Result<Json<SubmissionResult>> {
    tracing::info!(
        user_id = %claims.sub,
        event_id,
        answers = req.answers.len(),
        "submitting answers"
    );
    let answers = req
        .answers
        .into_iter()
        .map(|a| a.into_submitted())
        .collect::<Result<Vec<_>>>()?;
    let result = state
        .scoring_service
        .submit(claims.user_id(), event_id, answers)
        .await?;
    Ok(Json(result))
}

#[axum::debug_handler]
pub async fn leaderboard(
    State(state): State<AppState>,
    ValidatedPath(event_id): ValidatedPath<i64>,
    ValidatedQuery(query): ValidatedQuery<LeaderboardQuery>,
) -> Result<Json<LeaderboardResponse>> {
    let entries = state
        .ranking_service
        .leaderboard(event_id, query.limit)
        .await?;
    Ok(Json(LeaderboardResponse { event_id, entries }))
}

#[axum::debug_handler]
pub async fn user_result(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ValidatedPath(event_id): ValidatedPath<i64>,
) -> Result<Json<UserResultResponse>> {
    let result = state
        .ranking_service
        .user_result(claims.user_id(), event_id)
        .await?;
    Ok(Json(UserResultResponse {
        user_id: claims.sub,
        event_id,
        score: result.score,
        completed_at: result.completed_at,
        rank: result.rank,
    }))
}
