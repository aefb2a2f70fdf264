use serde::Serialize;
use sqlx::FromRow;

#[derive(FromRow, Debug, Clone, Serialize)]
pub struct Person {
    #[sqlx(rename = "person_id")]
    pub id: i64,
    #[serde(skip)]
    pub user_id: i64,
    pub name: String,
    pub contact: Option<String>,   // phone, email, free text
}
