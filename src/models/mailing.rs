use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Linear progression created -> launched -> completed. `Disabled` is a
/// moderation override and is never entered by the dispatch loop itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum MailingStatus {
    Created,
    Launched,
    Completed,
    Disabled,
}

impl MailingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Launched => "launched",
            Self::Completed => "completed",
            Self::Disabled => "disabled",
        }
    }

    /// A mailing that already ran to completion or was disabled by a
    /// moderator cannot be dispatched again.
    pub fn is_dispatchable(&self) -> bool {
        !matches!(self, Self::Completed | Self::Disabled)
    }
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Mailing {
    pub id: i64,
    pub user_id: i64,
    pub message_id: i64,
    pub status: MailingStatus,
    pub start_of_sending: Option<i64>,
    pub end_of_sending: Option<i64>,
    pub created_at: i64,
}
