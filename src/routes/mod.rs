pub mod admin;
pub mod extract;
pub mod health;
pub mod prediction;
pub mod quiz;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::auth::{require_admin, require_user};
use crate::AppState;

/// Full HTTP surface: public health, participant routes behind a user token
/// and administrative routes behind an admin token.
pub fn app(state: AppState) -> Router {
    let base_routes = Router::new().route("/health", get(health::health));

    let participant_api = Router::new()
        .route("/api/events/current", get(quiz::current_event))
        .route("/api/events/:id/questions", get(quiz::select_questions))
        .route("/api/events/:id/submit", post(quiz::submit_answers))
        .route("/api/events/:id/leaderboard", get(quiz::leaderboard))
        .route("/api/events/:id/result", get(quiz::user_result))
        .route("/api/predictions", post(prediction::create_prediction))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_user,
        ));

    let admin_api = Router::new()
        .route("/api/admin/events", post(admin::create_event))
        .route("/api/admin/questions", post(admin::create_question))
        .route(
            "/api/admin/questions/outdated",
            get(admin::outdated_questions),
        )
        .route(
            "/api/admin/questions/:id/supersede",
            post(admin::supersede_question),
        )
        .route(
            "/api/admin/questions/:id/history",
            get(admin::question_history),
        )
        .route("/api/admin/questions/:id/head", get(admin::question_head))
        .route(
            "/api/admin/predictions/:id",
            get(prediction::list_predictions),
        )
        .route(
            "/api/admin/predictions/:id/reconcile",
            post(prediction::reconcile),
        )
        .route("/api/admin/predictions/:id/judge", post(prediction::judge))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_admin,
        ));

    base_routes
        .merge(participant_api)
        .merge(admin_api)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
