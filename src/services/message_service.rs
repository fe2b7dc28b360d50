use anyhow::Result;
use sqlx::SqlitePool;

use crate::db::now_epoch;
use crate::models::message::Message;

pub async fn create(pool: &SqlitePool, user_id: i64, subject: &str, body: &str) -> Result<Message> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO messages (user_id, subject, body, created_at) VALUES (?, ?, ?, ?) RETURNING id",
    )
    .bind(user_id)
    .bind(subject)
    .bind(body)
    .bind(now_epoch())
    .fetch_one(pool)
    .await?;

    let message = sqlx::query_as::<_, Message>("SELECT * FROM messages WHERE id = ?")
        .bind(id)
        .fetch_one(pool)
        .await?;
    Ok(message)
}

pub async fn get(pool: &SqlitePool, id: i64) -> Result<Option<Message>> {
    let message = sqlx::query_as::<_, Message>("SELECT * FROM messages WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(message)
}

pub async fn list_for_user(pool: &SqlitePool, user_id: i64) -> Result<Vec<Message>> {
    let rows =
        sqlx::query_as::<_, Message>("SELECT * FROM messages WHERE user_id = ? ORDER BY id")
            .bind(user_id)
            .fetch_all(pool)
            .await?;
    Ok(rows)
}

pub async fn list_all(pool: &SqlitePool) -> Result<Vec<Message>> {
    let rows = sqlx::query_as::<_, Message>("SELECT * FROM messages ORDER BY id")
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn update(
    pool: &SqlitePool,
    user_id: i64,
    id: i64,
    subject: &str,
    body: &str,
) -> Result<bool> {
    let result =
        sqlx::query("UPDATE messages SET subject = ?, body = ? WHERE id = ? AND user_id = ?")
            .bind(subject)
            .bind(body)
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete(pool: &SqlitePool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM messages WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
