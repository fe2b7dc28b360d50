use anyhow::Result;
use sqlx::SqlitePool;

use crate::db::now_epoch;
use crate::models::mailing::{Mailing, MailingStatus};

/// Create a mailing linking one of the user's messages to a set of their
/// recipients. Both sides are checked for ownership before anything is
/// written.
pub async fn create(
    pool: &SqlitePool,
    user_id: i64,
    message_id: i64,
    recipient_ids: &[i64],
) -> Result<Mailing> {
    let owns_message =
        sqlx::query_scalar::<_, i64>("SELECT id FROM messages WHERE id = ? AND user_id = ?")
            .bind(message_id)
            .bind(user_id)
            .fetch_optional(pool)
            .await?;
    if owns_message.is_none() {
        anyhow::bail!("Message {} not found", message_id);
    }
    check_recipients(pool, user_id, recipient_ids).await?;

    let mut tx = pool.begin().await?;
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO mailings (user_id, message_id, status, created_at) \
         VALUES (?, ?, 'created', ?) RETURNING id",
    )
    .bind(user_id)
    .bind(message_id)
    .bind(now_epoch())
    .fetch_one(&mut *tx)
    .await?;
    for rid in recipient_ids {
        sqlx::query("INSERT OR IGNORE INTO mailing_recipients (mailing_id, recipient_id) VALUES (?, ?)")
            .bind(id)
            .bind(rid)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;

    let mailing = sqlx::query_as::<_, Mailing>("SELECT * FROM mailings WHERE id = ?")
        .bind(id)
        .fetch_one(pool)
        .await?;
    Ok(mailing)
}

async fn check_recipients(pool: &SqlitePool, user_id: i64, recipient_ids: &[i64]) -> Result<()> {
    for rid in recipient_ids {
        let owned =
            sqlx::query_scalar::<_, i64>("SELECT id FROM recipients WHERE id = ? AND user_id = ?")
                .bind(rid)
                .bind(user_id)
                .fetch_optional(pool)
                .await?;
        if owned.is_none() {
            anyhow::bail!("Recipient {} not found", rid);
        }
    }
    Ok(())
}

pub async fn get(pool: &SqlitePool, id: i64) -> Result<Option<Mailing>> {
    let mailing = sqlx::query_as::<_, Mailing>("SELECT * FROM mailings WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(mailing)
}

pub async fn recipient_ids(pool: &SqlitePool, mailing_id: i64) -> Result<Vec<i64>> {
    let ids = sqlx::query_scalar::<_, i64>(
        "SELECT recipient_id FROM mailing_recipients WHERE mailing_id = ? ORDER BY recipient_id",
    )
    .bind(mailing_id)
    .fetch_all(pool)
    .await?;
    Ok(ids)
}

pub async fn list_for_user(pool: &SqlitePool, user_id: i64) -> Result<Vec<Mailing>> {
    let rows =
        sqlx::query_as::<_, Mailing>("SELECT * FROM mailings WHERE user_id = ? ORDER BY id")
            .bind(user_id)
            .fetch_all(pool)
            .await?;
    Ok(rows)
}

pub async fn list_all(pool: &SqlitePool) -> Result<Vec<Mailing>> {
    let rows = sqlx::query_as::<_, Mailing>("SELECT * FROM mailings ORDER BY id")
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Owner-scoped update of the message and/or recipient set.
pub async fn update(
    pool: &SqlitePool,
    user_id: i64,
    id: i64,
    message_id: Option<i64>,
    recipient_ids: Option<&[i64]>,
) -> Result<bool> {
    let existing =
        sqlx::query_as::<_, Mailing>("SELECT * FROM mailings WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await?;
    let Some(_) = existing else {
        return Ok(false);
    };

    if let Some(mid) = message_id {
        let owns =
            sqlx::query_scalar::<_, i64>("SELECT id FROM messages WHERE id = ? AND user_id = ?")
                .bind(mid)
                .bind(user_id)
                .fetch_optional(pool)
                .await?;
        if owns.is_none() {
            anyhow::bail!("Message {} not found", mid);
        }
        sqlx::query("UPDATE mailings SET message_id = ? WHERE id = ?")
            .bind(mid)
            .bind(id)
            .execute(pool)
            .await?;
    }

    if let Some(rids) = recipient_ids {
        check_recipients(pool, user_id, rids).await?;
        let mut tx = pool.begin().await?;
        sqlx::query("DELETE FROM mailing_recipients WHERE mailing_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        for rid in rids {
            sqlx::query("INSERT INTO mailing_recipients (mailing_id, recipient_id) VALUES (?, ?)")
                .bind(id)
                .bind(rid)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
    }

    Ok(true)
}

pub async fn set_status(pool: &SqlitePool, id: i64, status: MailingStatus) -> Result<bool> {
    let result = sqlx::query("UPDATE mailings SET status = ? WHERE id = ?")
        .bind(status)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete(pool: &SqlitePool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM mailings WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
