use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use super::internal_error;
use crate::rbac::AuthUser;
use crate::services::{cache, recipient_service};
use crate::AppState;

#[derive(Deserialize)]
pub struct RecipientPayload {
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub comment: String,
}

async fn list(AuthUser(user): AuthUser, State(state): State<AppState>) -> impl IntoResponse {
    let result = if user.is_privileged() {
        cache::all_recipients(&state).await
    } else {
        recipient_service::list_for_user(&state.pool, user.id).await
    };
    match result {
        Ok(rows) => Json(rows).into_response(),
        Err(e) => internal_error(e),
    }
}

async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<RecipientPayload>,
) -> impl IntoResponse {
    match recipient_service::create(&state.pool, user.id, &req.email, &req.name, &req.comment).await
    {
        Ok(recipient) => {
            cache::invalidate_recipients(&state).await;
            (StatusCode::CREATED, Json(recipient)).into_response()
        }
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"ok": false, "error": e.to_string()})),
        )
            .into_response(),
    }
}

async fn detail(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    match recipient_service::get(&state.pool, id).await {
        Ok(Some(recipient)) if recipient.user_id == user.id || user.is_privileged() => {
            Json(recipient).into_response()
        }
        Ok(Some(_)) => (
            StatusCode::FORBIDDEN,
            Json(serde_json::json!({"ok": false, "error": "You do not have permission to view this recipient"})),
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
    Json(req): Json<RecipientPayload>,
) -> impl IntoResponse {
    match recipient_service::update(&state.pool, user.id, id, &req.email, &req.name, &req.comment)
        .await
    {
        Ok(true) => {
            cache::invalidate_recipients(&state).await;
            match recipient_service::get(&state.pool, id).await {
                Ok(Some(recipient)) => Json(recipient).into_response(),
                Ok(None) => StatusCode::NOT_FOUND.into_response(),
                Err(e) => internal_error(e),
            }
        }
        Ok(false) => (
            StatusCode::FORBIDDEN,
            Json(serde_json::json!({"ok": false, "error": "You do not have permission to edit this recipient"})),
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
    // Owner or moderator may delete
    match recipient_service::get(&state.pool, id).await {
        Ok(Some(recipient)) if recipient.user_id == user.id || user.is_privileged() => {
            match recipient_service::delete(&state.pool, id).await {
                Ok(_) => {
                    cache::invalidate_recipients(&state).await;
                    StatusCode::NO_CONTENT.into_response()
                }
                Err(e) => internal_error(e),
            }
        }
        Ok(Some(_)) => (
            StatusCode::FORBIDDEN,
            Json(serde_json::json!({"ok": false, "error": "You do not have permission to delete this recipient"})),
        )
            .into_response(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(e) => internal_error(e),
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/recipients", get(list).post(create))
        .route("/recipients/:id", get(detail).patch(update).delete(remove))
}
