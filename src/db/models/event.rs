use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A bookable appointment type owned by one user.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub duration_minutes: i64,
    pub clerk_user_id: String,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Validated event fields, shared by create and update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventForm {
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub duration_minutes: i64,
}
