use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    Extension,
};

use crate::dto::admin_dto::{JudgeRequest, ReconcileRequest, ReconcileResponse};
use crate::dto::quiz_dto::CreatePredictionRequest;
use crate::error::{Error, Result};
use crate::middleware::auth::Claims;
use crate::models::prediction::{PredictionAnswer, Verdict};
use crate::routes::extract::{ValidatedJson, ValidatedPath};
use crate::services::prediction_service::JudgeOutcome;
use crate::AppState;

#[axum::debug_handler]
pub async fn create_prediction(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ValidatedJson(req): ValidatedJson<CreatePredictionRequest>,
) -> Result<(StatusCode, Json<PredictionAnswer>)> {
    let prediction = state
        .prediction_service
        .submit_prediction(claims.user_id(), req.question_id, &req.predicted_answer)
        .await?;
    Ok((StatusCode::CREATED, Json(prediction)))
}

#[axum::debug_handler]
pub async fn list_predictions(
    State(state): State<AppState>,
    ValidatedPath(question_id): ValidatedPath<i64>,
) -> Result<Json<Vec<PredictionAnswer>>> {
    Ok(Json(state.prediction_service.list(question_id).await?))
}

#[axum::debug_handler]
pub async fn reconcile(
    State(state): State<AppState>,
    ValidatedPath(question_id): ValidatedPath<i64>,
    ValidatedJson(req): ValidatedJson<ReconcileRequest>,
) -> Result<Json<ReconcileResponse>> {
    let verdicts: Vec<Verdict> = req.verdicts.into_iter().map(Verdict::from).collect();
    let reconciled = state
        .prediction_service
        .reconcile(question_id, &req.actual_answer, &verdicts)
        .await?;
    Ok(Json(ReconcileResponse {
        question_id,
        reconciled,
    }))
}

#[axum::debug_handler]
pub async fn judge(
    State(state): State<AppState>,
    ValidatedPath(question_id): ValidatedPath<i64>,
    ValidatedJson(req): ValidatedJson<JudgeRequest>,
) -> Result<Json<JudgeOutcome>> {
    let source = state
        .verdict_source
        .clone()
        .ok_or_else(|| Error::ExternalService("No verdict source is configured".to_string()))?;
    let outcome = state
        .prediction_service
        .judge_and_reconcile(question_id, &req.actual_answer, source.as_ref())
        .await?;
    Ok(Json(outcome))
}
