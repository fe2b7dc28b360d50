use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)] // never serialize password hash
    pub password_hash: String,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub country: Option<String>,
    pub role: String, // 'admin', 'moderator' or 'member'
    pub is_active: bool,
    pub is_blocked: bool,
    #[serde(skip_serializing)]
    pub confirm_token: Option<String>,
    #[serde(skip_serializing)]
    pub session_token: Option<String>,
    pub created_at: i64,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }

    /// Admins and moderators may see other users' rows and act on them.
    pub fn is_privileged(&self) -> bool {
        matches!(self.role.as_str(), "admin" | "moderator")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterReq {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginReq {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub email: String,
    pub role: String,
}
