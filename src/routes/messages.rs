use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use super::internal_error;
use crate::rbac::AuthUser;
use crate::services::{cache, message_service};
use crate::AppState;

#[derive(Deserialize)]
pub struct MessagePayload {
    pub subject: String,
    pub body: String,
}

async fn list(AuthUser(user): AuthUser, State(state): State<AppState>) -> impl IntoResponse {
    let result = if user.is_privileged() {
        cache::all_messages(&state).await
    } else {
        message_service::list_for_user(&state.pool, user.id).await
    };
    match result {
        Ok(rows) => Json(rows).into_response(),
        Err(e) => internal_error(e),
    }
}

async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<MessagePayload>,
) -> impl IntoResponse {
    match message_service::create(&state.pool, user.id, &req.subject, &req.body).await {
        Ok(message) => {
            cache::invalidate_messages(&state).await;
            (StatusCode::CREATED, Json(message)).into_response()
        }
        Err(e) => internal_error(e),
    }
}

async fn detail(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    match message_service::get(&state.pool, id).await {
        Ok(Some(message)) if message.user_id == user.id || user.is_privileged() => {
            Json(message).into_response()
        }
        Ok(Some(_)) => (
            StatusCode::FORBIDDEN,
            Json(serde_json::json!({"ok": false, "error": "You do not have permission to view this message"})),
        )
            .into_response(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(e) => internal_error(e),
    }
}

async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<MessagePayload>,
) -> impl IntoResponse {
    match message_service::update(&state.pool, user.id, id, &req.subject, &req.body).await {
        Ok(true) => {
            cache::invalidate_messages(&state).await;
            match message_service::get(&state.pool, id).await {
                Ok(Some(message)) => Json(message).into_response(),
                Ok(None) => StatusCode::NOT_FOUND.into_response(),
                Err(e) => internal_error(e),
            }
        }
        Ok(false) => (
            StatusCode::FORBIDDEN,
            Json(serde_json::json!({"ok": false, "error": "You do not have permission to edit this message"})),
        )
            .into_response(),
        Err(e) => internal_error(e),
    }
}

async fn remove(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    match message_service::get(&state.pool, id).await {
        Ok(Some(message)) if message.user_id == user.id || user.is_privileged() => {
            match message_service::delete(&state.pool, id).await {
                Ok(_) => {
                    cache::invalidate_messages(&state).await;
                    StatusCode::NO_CONTENT.into_response()
                }
                Err(e) => internal_error(e),
            }
        }
        Ok(Some(_)) => (
            StatusCode::FORBIDDEN,
            Json(serde_json::json!({"ok": false, "error": "You do not have permission to delete this message"})),
        )
            .into_response(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(e) => internal_error(e),
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/messages", get(list).post(create))
        .route("/messages/:id", get(detail).patch(update).delete(remove))
}
