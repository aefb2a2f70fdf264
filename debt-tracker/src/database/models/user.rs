use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::FromRow;

#[derive(FromRow, Debug, Clone)]
pub struct User {
    pub user_id: i64,
    pub name: Option<String>,
    pub email: String,             // stored trimmed and lowercased
    pub password_hash: String,     // Argon2 PHC string
    pub is_active: bool,
    pub level: i64,                // 1 + number of earned badges
    pub created_at: NaiveDateTime,
}

/// Public view of a user; never carries the password hash.
#[derive(Debug, Clone, Serialize)]
pub struct UserRead {
    pub id: i64,
    pub name: Option<String>,
    pub email: String,
    pub level: i64,
    pub created_at: NaiveDateTime,
}

impl From<User> for UserRead {
    fn from(u: User) -> Self {
        Self {
            id: u.user_id,
            name: u.name,
            email: u.email,
            level: u.level,
            created_at: u.created_at,
        }
    }
}
