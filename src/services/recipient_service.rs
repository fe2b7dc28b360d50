use anyhow::Result;
use sqlx::SqlitePool;

use crate::db::now_epoch;
use crate::models::recipient::Recipient;

pub async fn create(
    pool: &SqlitePool,
    user_id: i64,
    email: &str,
    name: &str,
    comment: &str,
) -> Result<Recipient> {
    // Email is unique per owning user
    let existing =
        sqlx::query_scalar::<_, i64>("SELECT id FROM recipients WHERE user_id = ? AND email = ?")
            .bind(user_id)
            .bind(email)
            .fetch_optional(pool)
            .await?;
    if existing.is_some() {
        anyhow::bail!("Recipient already exists: {}", email);
    }

    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO recipients (user_id, email, name, comment, created_at) \
         VALUES (?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(user_id)
    .bind(email)
    .bind(name)
    .bind(comment)
    .bind(now_epoch())
    .fetch_one(pool)
    .await?;

    let recipient = sqlx::query_as::<_, Recipient>("SELECT * FROM recipients WHERE id = ?")
        .bind(id)
        .fetch_one(pool)
        .await?;
    Ok(recipient)
}

pub async fn get(pool: &SqlitePool, id: i64) -> Result<Option<Recipient>> {
    let recipient = sqlx::query_as::<_, Recipient>("SELECT * FROM recipients WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(recipient)
}

pub async fn list_for_user(pool: &SqlitePool, user_id: i64) -> Result<Vec<Recipient>> {
    let rows =
        sqlx::query_as::<_, Recipient>("SELECT * FROM recipients WHERE user_id = ? ORDER BY id")
            .bind(user_id)
            .fetch_all(pool)
            .await?;
    Ok(rows)
}

pub async fn list_all(pool: &SqlitePool) -> Result<Vec<Recipient>> {
    let rows = sqlx::query_as::<_, Recipient>("SELECT * FROM recipients ORDER BY id")
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Owner-scoped update; returns false when the row is absent or foreign.
pub async fn update(
    pool: &SqlitePool,
    user_id: i64,
    id: i64,
    email: &str,
    name: &str,
    comment: &str,
) -> Result<bool> {
    let result =
        sqlx::query("UPDATE recipients SET email = ?, name = ?, comment = ? WHERE id = ? AND user_id = ?")
            .bind(email)
            .bind(name)
            .bind(comment)
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete(pool: &SqlitePool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM recipients WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
