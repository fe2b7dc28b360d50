use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Recipient {
    pub id: i64,
    pub user_id: i64,
    pub email: String,
    pub name: String,
    pub comment: String,
    pub created_at: i64,
}
