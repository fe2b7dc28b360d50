use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use super::internal_error;
use crate::rbac::AuthUser;
use crate::services::{attempt_service, mailing_service};
use crate::AppState;

async fn list(AuthUser(user): AuthUser, State(state): State<AppState>) -> impl IntoResponse {
    let attempts = match attempt_service::list_for_user(&state.pool, user.id).await {
        Ok(rows) => rows,
        Err(e) => return internal_error(e),
    };
    match attempt_service::counts_for_user(&state.pool, user.id).await {
        Ok(counts) => Json(serde_json::json!({
            "attempts": attempts,
            "total": counts.total,
            "successful": counts.successful,
        }))
        .into_response(),
        Err(e) => internal_error(e),
    }
}

async fn detail(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    match attempt_service::get(&state.pool, id).await {
        Ok(Some(attempt)) if attempt.user_id == user.id || user.is_privileged() => {
            Json(attempt).into_response()
        }
        Ok(Some(_)) => (
            StatusCode::FORBIDDEN,
            Json(serde_json::json!({"ok": false, "error": "You do not have permission to view this attempt"})),
        )
            .into_response(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(e) => internal_error(e),
    }
}

/// Attempts of one mailing, for the mailing owner or a moderator.
async fn for_mailing(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    match mailing_service::get(&state.pool, id).await {
        Ok(Some(mailing)) if mailing.user_id == user.id || user.is_privileged() => {
            match attempt_service::list_for_mailing(&state.pool, id).await {
                Ok(rows) => Json(rows).into_response(),
                Err(e) => internal_error(e),
            }
        }
        Ok(Some(_)) => (
            StatusCode::FORBIDDEN,
            Json(serde_json::json!({"ok": false, "error": "You do not have permission to view this mailing"})),
        )
            .into_response(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(e) => internal_error(e),
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/attempts", get(list))
        .route("/attempts/:id", get(detail))
        .route("/mailings/:id/attempts", get(for_mailing))
}
