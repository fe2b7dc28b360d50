use serde::Serialize;
use sqlx::SqlitePool;
use thiserror::Error;

use crate::db::now_epoch;
use crate::models::attempt::AttemptStatus;
use crate::models::mailing::{Mailing, MailingStatus};
use crate::models::message::Message;
use crate::models::recipient::Recipient;
use crate::models::user::User;
use crate::smtp::MailSender;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Mailing {0} not found")]
    NotFound(i64),
    #[error("Mailing {0} cannot be dispatched: status is {1}")]
    NotDispatchable(i64, &'static str),
    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

#[derive(Debug, Serialize)]
pub struct DispatchSummary {
    pub total: usize,
    pub sent: usize,
    pub failed: usize,
}

/// Run a mailing synchronously: mark it launched, send the message to every
/// associated recipient, record one attempt per recipient, and mark the
/// mailing completed. A failed send is recorded and skipped over; it never
/// aborts the batch and never changes the final status.
pub async fn send_mailing(
    pool: &SqlitePool,
    mailer: &dyn MailSender,
    mailing_id: i64,
    user: &User,
) -> Result<DispatchSummary, DispatchError> {
    let mailing =
        sqlx::query_as::<_, Mailing>("SELECT * FROM mailings WHERE id = ? AND user_id = ?")
            .bind(mailing_id)
            .bind(user.id)
            .fetch_optional(pool)
            .await?
            .ok_or(DispatchError::NotFound(mailing_id))?;

    if !mailing.status.is_dispatchable() {
        return Err(DispatchError::NotDispatchable(
            mailing_id,
            mailing.status.as_str(),
        ));
    }

    let message = sqlx::query_as::<_, Message>("SELECT * FROM messages WHERE id = ?")
        .bind(mailing.message_id)
        .fetch_one(pool)
        .await?;

    let recipients = sqlx::query_as::<_, Recipient>(
        "SELECT r.* FROM recipients r \
         JOIN mailing_recipients mr ON mr.recipient_id = r.id \
         WHERE mr.mailing_id = ? ORDER BY r.id",
    )
    .bind(mailing_id)
    .fetch_all(pool)
    .await?;

    sqlx::query("UPDATE mailings SET status = ?, start_of_sending = ? WHERE id = ?")
        .bind(MailingStatus::Launched)
        .bind(now_epoch())
        .bind(mailing_id)
        .execute(pool)
        .await?;

    tracing::info!(mailing_id, recipients = recipients.len(), "dispatching mailing");

    let mut sent = 0usize;
    let mut failed = 0usize;
    for recipient in &recipients {
        let (status, response) = match mailer.send(&recipient.email, &message.subject, &message.body)
        {
            Ok(()) => {
                sent += 1;
                (AttemptStatus::Completed, "Email sent successfully".to_string())
            }
            Err(e) => {
                failed += 1;
                tracing::error!(mailing_id, recipient = %recipient.email, "send failed: {e}");
                (AttemptStatus::Failed, e.to_string())
            }
        };

        sqlx::query(
            "INSERT INTO attempts (mailing_id, user_id, recipient_email, dt, status, response) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(mailing_id)
        .bind(user.id)
        .bind(&recipient.email)
        .bind(now_epoch())
        .bind(status)
        .bind(&response)
        .execute(pool)
        .await?;
    }

    sqlx::query("UPDATE mailings SET status = ?, end_of_sending = ? WHERE id = ?")
        .bind(MailingStatus::Completed)
        .bind(now_epoch())
        .bind(mailing_id)
        .execute(pool)
        .await?;

    tracing::info!(mailing_id, sent, failed, "mailing completed");

    Ok(DispatchSummary {
        total: recipients.len(),
        sent,
        failed,
    })
}
