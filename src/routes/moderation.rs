use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use super::internal_error;
use crate::models::mailing::MailingStatus;
use crate::models::user::User;
use crate::rbac::Moderator;
use crate::services::{cache, mailing_service};
use crate::AppState;

async fn list_users(
    Moderator(_): Moderator,
    State(pool): State<sqlx::SqlitePool>,
) -> impl IntoResponse {
    match sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY id")
        .fetch_all(&pool)
        .await
    {
        Ok(users) => Json(users).into_response(),
        Err(e) => internal_error(e),
    }
}

async fn block_user(
    Moderator(moderator): Moderator,
    State(pool): State<sqlx::SqlitePool>,
    Path(user_id): Path<i64>,
) -> impl IntoResponse {
    // Revoke the session along with the block so the user drops out now
    match sqlx::query("UPDATE users SET is_blocked = 1, session_token = NULL WHERE id = ?")
        .bind(user_id)
        .execute(&pool)
        .await
    {
        Ok(r) if r.rows_affected() > 0 => {
            tracing::info!(user_id, moderator = moderator.id, "user blocked");
            Json(serde_json::json!({"ok": true})).into_response()
        }
        Ok(_) => StatusCode::NOT_FOUND.into_response(),
        Err(e) => internal_error(e),
    }
}

async fn unblock_user(
    Moderator(moderator): Moderator,
    State(pool): State<sqlx::SqlitePool>,
    Path(user_id): Path<i64>,
) -> impl IntoResponse {
    match sqlx::query("UPDATE users SET is_blocked = 0 WHERE id = ?")
        .bind(user_id)
        .execute(&pool)
        .await
    {
        Ok(r) if r.rows_affected() > 0 => {
            tracing::info!(user_id, moderator = moderator.id, "user unblocked");
            Json(serde_json::json!({"ok": true})).into_response()
        }
        Ok(_) => StatusCode::NOT_FOUND.into_response(),
        Err(e) => internal_error(e),
    }
}

async fn disable_mailing(
    Moderator(moderator): Moderator,
    State(state): State<AppState>,
    Path(mailing_id): Path<i64>,
) -> impl IntoResponse {
    match mailing_service::set_status(&state.pool, mailing_id, MailingStatus::Disabled).await {
        Ok(true) => {
            cache::invalidate_mailings(&state).await;
            tracing::info!(mailing_id, moderator = moderator.id, "mailing disabled");
            Json(serde_json::json!({"ok": true})).into_response()
        }
        Ok(false) => StatusCode::NOT_FOUND.into_response(),
        Err(e) => internal_error(e),
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/moderation/users", get(list_users))
        .route("/moderation/users/:user_id/block", post(block_user))
        .route("/moderation/users/:user_id/unblock", post(unblock_user))
        .route("/moderation/mailings/:mailing_id/disable", post(disable_mailing))
}
