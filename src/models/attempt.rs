use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum AttemptStatus {
    Created,
    Launched,
    Completed,
    Failed,
}

impl AttemptStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Launched => "launched",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

/// Append-only audit record of one per-recipient send outcome.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Attempt {
    pub id: i64,
    pub mailing_id: i64,
    pub user_id: i64,
    pub recipient_email: String,
    pub dt: i64,
    pub status: AttemptStatus,
    pub response: String,
}
