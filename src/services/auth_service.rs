use anyhow::Result;
use bcrypt::{hash, verify, DEFAULT_COST};
use sqlx::SqlitePool;

use crate::db::now_epoch;
use crate::models::user::{RegisterReq, User};
use crate::smtp::MailSender;

/// Register a new user. The account starts inactive; a confirmation link is
/// mailed out and the account unlocks via `confirm_email`. A failure to send
/// the confirmation mail is logged, not fatal.
pub async fn register_user(
    pool: &SqlitePool,
    mailer: &dyn MailSender,
    base_url: &str,
    req: RegisterReq,
) -> Result<User> {
    let existing = sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE email = ?")
        .bind(&req.email)
        .fetch_optional(pool)
        .await?;
    if existing.is_some() {
        anyhow::bail!("User already exists: {}", req.email);
    }

    // First registered user becomes admin
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;
    let role = if count == 0 { "admin" } else { "member" };

    let password_hash = hash(req.password, DEFAULT_COST)?;
    let confirm_token = uuid::Uuid::new_v4().simple().to_string();

    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO users (email, password_hash, name, role, is_active, is_blocked, confirm_token, created_at) \
         VALUES (?, ?, ?, ?, 0, 0, ?, ?) RETURNING id",
    )
    .bind(&req.email)
    .bind(&password_hash)
    .bind(&req.name)
    .bind(role)
    .bind(&confirm_token)
    .bind(now_epoch())
    .fetch_one(pool)
    .await?;

    let url = format!("{base_url}/auth/email-confirm/{confirm_token}");
    if let Err(e) = mailer.send(
        &req.email,
        "Email confirmation",
        &format!("Follow the link to confirm your registration {url}"),
    ) {
        tracing::warn!(email = %req.email, "confirmation email failed: {e}");
    }

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(id)
        .fetch_one(pool)
        .await?;
    Ok(user)
}

pub async fn confirm_email(pool: &SqlitePool, token: &str) -> Result<bool> {
    let result = sqlx::query(
        "UPDATE users SET is_active = 1, confirm_token = NULL WHERE confirm_token = ?",
    )
    .bind(token)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn verify_user(pool: &SqlitePool, email: &str, password: &str) -> Result<Option<User>> {
    let user_opt = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(pool)
        .await?;

    if let Some(user) = user_opt {
        if verify(password, &user.password_hash)? {
            return Ok(Some(user));
        }
    }
    Ok(None)
}

/// Issue a fresh opaque session token for a logged-in user.
pub async fn issue_session(pool: &SqlitePool, user_id: i64) -> Result<String> {
    let token = uuid::Uuid::new_v4().simple().to_string();
    sqlx::query("UPDATE users SET session_token = ? WHERE id = ?")
        .bind(&token)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(token)
}

pub async fn clear_session(pool: &SqlitePool, user_id: i64) -> Result<()> {
    sqlx::query("UPDATE users SET session_token = NULL WHERE id = ?")
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Mail a reset token if the address is known. Always returns Ok so the
/// endpoint cannot be used to probe which emails are registered.
pub async fn start_password_reset(
    pool: &SqlitePool,
    mailer: &dyn MailSender,
    email: &str,
) -> Result<()> {
    let user_id = sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(pool)
        .await?;
    let Some(user_id) = user_id else {
        return Ok(());
    };

    let token = uuid::Uuid::new_v4().simple().to_string();
    sqlx::query("UPDATE users SET confirm_token = ? WHERE id = ?")
        .bind(&token)
        .bind(user_id)
        .execute(pool)
        .await?;

    if let Err(e) = mailer.send(
        email,
        "Password reset",
        &format!("Use this token to reset your password: {token}"),
    ) {
        tracing::warn!(email, "password reset email failed: {e}");
    }
    Ok(())
}

/// Set a new password by reset token. Existing sessions are revoked.
pub async fn finish_password_reset(
    pool: &SqlitePool,
    token: &str,
    new_password: &str,
) -> Result<bool> {
    let password_hash = hash(new_password, DEFAULT_COST)?;
    let result = sqlx::query(
        "UPDATE users SET password_hash = ?, confirm_token = NULL, session_token = NULL \
         WHERE confirm_token = ?",
    )
    .bind(&password_hash)
    .bind(token)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn update_profile(
    pool: &SqlitePool,
    user_id: i64,
    name: Option<String>,
    phone: Option<String>,
    country: Option<String>,
) -> Result<User> {
    sqlx::query("UPDATE users SET name = ?, phone = ?, country = ? WHERE id = ?")
        .bind(&name)
        .bind(&phone)
        .bind(&country)
        .bind(user_id)
        .execute(pool)
        .await?;

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_one(pool)
        .await?;
    Ok(user)
}
