use anyhow::Result;
use serde::Serialize;
use sqlx::SqlitePool;

use crate::models::attempt::Attempt;

pub async fn get(pool: &SqlitePool, id: i64) -> Result<Option<Attempt>> {
    let attempt = sqlx::query_as::<_, Attempt>("SELECT * FROM attempts WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(attempt)
}

pub async fn list_for_user(pool: &SqlitePool, user_id: i64) -> Result<Vec<Attempt>> {
    let rows =
        sqlx::query_as::<_, Attempt>("SELECT * FROM attempts WHERE user_id = ? ORDER BY id")
            .bind(user_id)
            .fetch_all(pool)
            .await?;
    Ok(rows)
}

pub async fn list_for_mailing(pool: &SqlitePool, mailing_id: i64) -> Result<Vec<Attempt>> {
    let rows =
        sqlx::query_as::<_, Attempt>("SELECT * FROM attempts WHERE mailing_id = ? ORDER BY id")
            .bind(mailing_id)
            .fetch_all(pool)
            .await?;
    Ok(rows)
}

#[derive(Debug, Serialize)]
pub struct AttemptCounts {
    pub total: i64,
    pub successful: i64,
}

pub async fn counts_for_user(pool: &SqlitePool, user_id: i64) -> Result<AttemptCounts> {
    let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM attempts WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(pool)
        .await?;
    let successful = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM attempts WHERE user_id = ? AND status = 'completed'",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;
    Ok(AttemptCounts { total, successful })
}
