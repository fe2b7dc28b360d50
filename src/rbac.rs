use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, StatusCode},
};
use sqlx::SqlitePool;

use crate::models::user::User;

/// Authenticated requester, resolved from the session token in the
/// Authorization header. Blocked and unconfirmed accounts are rejected here
/// so no handler has to re-check the flags.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    SqlitePool: FromRef<S>,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .map(|v| v.strip_prefix("Bearer ").unwrap_or(v).trim())
            .filter(|v| !v.is_empty())
            .ok_or((StatusCode::UNAUTHORIZED, "Missing or invalid token"))?;

        let pool = SqlitePool::from_ref(state);
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE session_token = ?")
            .bind(token)
            .fetch_optional(&pool)
            .await
            .map_err(|_| (StatusCode::INTERNAL_SERVER_ERROR, "Database error"))?
            .ok_or((StatusCode::UNAUTHORIZED, "Missing or invalid token"))?;

        if user.is_blocked {
            return Err((StatusCode::FORBIDDEN, "Account is blocked"));
        }
        if !user.is_active {
            return Err((StatusCode::FORBIDDEN, "Email is not confirmed"));
        }

        Ok(AuthUser(user))
    }
}

/// Guard for moderation endpoints: moderator or admin role required.
pub struct Moderator(pub User);

#[async_trait]
impl<S> FromRequestParts<S> for Moderator
where
    S: Send + Sync,
    SqlitePool: FromRef<S>,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;
        if user.is_privileged() {
            Ok(Moderator(user))
        } else {
            Err((StatusCode::FORBIDDEN, "Moderator rights required"))
        }
    }
}
