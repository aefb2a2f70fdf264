use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::FromRow;

#[derive(FromRow, Debug, Clone, Serialize)]
pub struct Badge {
    #[sqlx(rename = "badge_id")]
    pub id: i64,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}

/// A badge earned by a user, joined with its catalog entry.
#[derive(Debug, Clone, Serialize)]
pub struct UserBadge {
    pub id: i64,
    pub badge_id: i64,
    pub earned_at: NaiveDateTime,
    pub badge: Badge,
}
