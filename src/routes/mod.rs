use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};

use crate::rbac::AuthUser;
use crate::services::stats_service;
use crate::AppState;

pub mod attempts;
pub mod auth;
pub mod mailings;
pub mod messages;
pub mod moderation;
pub mod recipients;

pub(crate) fn internal_error(e: impl std::fmt::Display) -> Response {
    tracing::error!("request failed: {e}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({"ok": false, "error": e.to_string()})),
    )
        .into_response()
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({"ok": true}))
}

/// Home dashboard counters.
async fn stats(_auth: AuthUser, State(pool): State<sqlx::SqlitePool>) -> impl IntoResponse {
    match stats_service::overview(&pool).await {
        Ok(stats) => Json(stats).into_response(),
        Err(e) => internal_error(e),
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/stats", get(stats))
        .merge(auth::router())
        .merge(recipients::router())
        .merge(messages::router())
        .merge(mailings::router())
        .merge(attempts::router())
        .merge(moderation::router())
}
