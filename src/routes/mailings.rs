use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use super::internal_error;
use crate::models::mailing::Mailing;
use crate::rbac::AuthUser;
use crate::services::dispatch_service::DispatchError;
use crate::services::{cache, dispatch_service, mailing_service};
use crate::AppState;

#[derive(Deserialize)]
pub struct CreateMailingReq {
    pub message_id: i64,
    pub recipient_ids: Vec<i64>,
}

#[derive(Deserialize)]
pub struct UpdateMailingReq {
    pub message_id: Option<i64>,
    pub recipient_ids: Option<Vec<i64>>,
}

#[derive(Serialize)]
pub struct MailingDetail {
    #[serde(flatten)]
    pub mailing: Mailing,
    pub recipient_ids: Vec<i64>,
}

async fn list(AuthUser(user): AuthUser, State(state): State<AppState>) -> impl IntoResponse {
    let result = if user.is_privileged() {
        cache::all_mailings(&state).await
    } else {
        mailing_service::list_for_user(&state.pool, user.id).await
    };
    match result {
        Ok(rows) => Json(rows).into_response(),
        Err(e) => internal_error(e),
    }
}

async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateMailingReq>,
) -> impl IntoResponse {
    match mailing_service::create(&state.pool, user.id, req.message_id, &req.recipient_ids).await {
        Ok(mailing) => {
            cache::invalidate_mailings(&state).await;
            let detail = MailingDetail {
                recipient_ids: req.recipient_ids,
                mailing,
            };
            (StatusCode::CREATED, Json(detail)).into_response()
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
    match mailing_service::get(&state.pool, id).await {
        Ok(Some(mailing)) if mailing.user_id == user.id || user.is_privileged() => {
            match mailing_service::recipient_ids(&state.pool, id).await {
                Ok(recipient_ids) => Json(MailingDetail {
                    mailing,
                    recipient_ids,
                })
                .into_response(),
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

async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateMailingReq>,
) -> impl IntoResponse {
    match mailing_service::update(
        &state.pool,
        user.id,
        id,
        req.message_id,
        req.recipient_ids.as_deref(),
    )
    .await
    {
        Ok(true) => {
            cache::invalidate_mailings(&state).await;
            match mailing_service::get(&state.pool, id).await {
                Ok(Some(mailing)) => match mailing_service::recipient_ids(&state.pool, id).await {
                    Ok(recipient_ids) => Json(MailingDetail {
                        mailing,
                        recipient_ids,
                    })
                    .into_response(),
                    Err(e) => internal_error(e),
                },
                Ok(None) => StatusCode::NOT_FOUND.into_response(),
                Err(e) => internal_error(e),
            }
        }
        Ok(false) => (
            StatusCode::FORBIDDEN,
            Json(serde_json::json!({"ok": false, "error": "You do not have permission to edit this mailing"})),
        )
            .into_response(),
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"ok": false, "error": e.to_string()})),
        )
            .into_response(),
    }
}

async fn remove(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    match mailing_service::get(&state.pool, id).await {
        Ok(Some(mailing)) if mailing.user_id == user.id || user.is_privileged() => {
            match mailing_service::delete(&state.pool, id).await {
                Ok(_) => {
                    cache::invalidate_mailings(&state).await;
                    StatusCode::NO_CONTENT.into_response()
                }
                Err(e) => internal_error(e),
            }
        }
        Ok(Some(_)) => (
            StatusCode::FORBIDDEN,
            Json(serde_json::json!({"ok": false, "error": "You do not have permission to delete this mailing"})),
        )
            .into_response(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(e) => internal_error(e),
    }
}

/// POST /mailings/:id/send - dispatch the mailing inline, blocking until
/// every recipient was attempted.
async fn send(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    match dispatch_service::send_mailing(&state.pool, state.mailer.as_ref(), id, &user).await {
        Ok(summary) => {
            cache::invalidate_mailings(&state).await;
            Json(serde_json::json!({
                "ok": true,
                "message": "Mailing has been sent",
                "total": summary.total,
                "sent": summary.sent,
                "failed": summary.failed,
            }))
            .into_response()
        }
        Err(DispatchError::NotFound(_)) => StatusCode::NOT_FOUND.into_response(),
        Err(e @ DispatchError::NotDispatchable(..)) => (
            StatusCode::CONFLICT,
            Json(serde_json::json!({"ok": false, "error": e.to_string()})),
        )
            .into_response(),
        Err(DispatchError::Db(e)) => internal_error(e),
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/mailings", get(list).post(create))
        .route("/mailings/:id", get(detail).patch(update).delete(remove))
        .route("/mailings/:id/send", post(send))
}
