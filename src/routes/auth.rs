use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use super::internal_error;
use crate::models::user::{AuthResponse, LoginReq, RegisterReq};
use crate::rbac::AuthUser;
use crate::services::auth_service;
use crate::AppState;

async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterReq>,
) -> impl IntoResponse {
    if req.email.is_empty() || req.password.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"ok": false, "error": "email and password are required"})),
        )
            .into_response();
    }
    match auth_service::register_user(
        &state.pool,
        state.mailer.as_ref(),
        &state.config.public_base_url,
        req,
    )
    .await
    {
        Ok(user) => {
            tracing::info!(email = %user.email, "user registered");
            (
                StatusCode::CREATED,
                Json(serde_json::json!({
                    "ok": true,
                    "email": user.email,
                    "role": user.role,
                    "message": "Confirmation email sent"
                })),
            )
                .into_response()
        }
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"ok": false, "error": e.to_string()})),
        )
            .into_response(),
    }
}

async fn login(State(state): State<AppState>, Json(req): Json<LoginReq>) -> impl IntoResponse {
    match auth_service::verify_user(&state.pool, &req.email, &req.password).await {
        Ok(Some(user)) => {
            if user.is_blocked {
                return (
                    StatusCode::FORBIDDEN,
                    Json(serde_json::json!({"ok": false, "error": "Account is blocked"})),
                )
                    .into_response();
            }
            if !user.is_active {
                return (
                    StatusCode::FORBIDDEN,
                    Json(serde_json::json!({"ok": false, "error": "Email is not confirmed"})),
                )
                    .into_response();
            }
            match auth_service::issue_session(&state.pool, user.id).await {
                Ok(token) => Json(AuthResponse {
                    token,
                    email: user.email,
                    role: user.role,
                })
                .into_response(),
                Err(e) => internal_error(e),
            }
        }
        Ok(None) => (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({"ok": false, "error": "Invalid email or password"})),
        )
            .into_response(),
        Err(e) => internal_error(e),
    }
}

async fn logout(AuthUser(user): AuthUser, State(state): State<AppState>) -> impl IntoResponse {
    match auth_service::clear_session(&state.pool, user.id).await {
        Ok(()) => Json(serde_json::json!({"ok": true})).into_response(),
        Err(e) => internal_error(e),
    }
}

async fn email_confirm(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> impl IntoResponse {
    match auth_service::confirm_email(&state.pool, &token).await {
        Ok(true) => Json(serde_json::json!({"ok": true, "message": "Email confirmed"})).into_response(),
        Ok(false) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"ok": false, "error": "Unknown confirmation token"})),
        )
            .into_response(),
        Err(e) => internal_error(e),
    }
}

async fn me(AuthUser(user): AuthUser) -> impl IntoResponse {
    Json(user)
}

#[derive(Deserialize)]
struct ProfileReq {
    name: Option<String>,
    phone: Option<String>,
    country: Option<String>,
}

async fn update_me(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ProfileReq>,
) -> impl IntoResponse {
    // Absent fields keep their current values
    let name = req.name.or(user.name);
    let phone = req.phone.or(user.phone);
    let country = req.country.or(user.country);
    match auth_service::update_profile(&state.pool, user.id, name, phone, country).await {
        Ok(updated) => Json(updated).into_response(),
        Err(e) => internal_error(e),
    }
}

#[derive(Deserialize)]
struct ResetReq {
    email: String,
}

async fn password_reset(
    State(state): State<AppState>,
    Json(req): Json<ResetReq>,
) -> impl IntoResponse {
    match auth_service::start_password_reset(&state.pool, state.mailer.as_ref(), &req.email).await {
        Ok(()) => Json(serde_json::json!({"ok": true})).into_response(),
        Err(e) => internal_error(e),
    }
}

#[derive(Deserialize)]
struct ResetConfirmReq {
    token: String,
    new_password: String,
}

async fn password_reset_confirm(
    State(state): State<AppState>,
    Json(req): Json<ResetConfirmReq>,
) -> impl IntoResponse {
    match auth_service::finish_password_reset(&state.pool, &req.token, &req.new_password).await {
        Ok(true) => Json(serde_json::json!({"ok": true, "message": "Password updated"})).into_response(),
        Ok(false) => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"ok": false, "error": "Invalid or expired token"})),
        )
            .into_response(),
        Err(e) => internal_error(e),
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/email-confirm/:token", get(email_confirm))
        .route("/auth/me", get(me).patch(update_me))
        .route("/auth/password-reset", post(password_reset))
        .route("/auth/password-reset/confirm", post(password_reset_confirm))
}
