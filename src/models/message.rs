use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Message {
    pub id: i64,
    pub user_id: i64,
    pub subject: String,
    pub body: String,
    pub created_at: i64,
}
