use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::DayOfWeek;

/// A user's weekly recurring availability. One per user.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub id: String,
    pub timezone: String,
    pub clerk_user_id: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// One time window on a weekday. Times are kept as entered (`9:00`, `17:30`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Availability {
    pub day_of_week: DayOfWeek,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleWithAvailabilities {
    #[serde(flatten)]
    pub schedule: Schedule,
    pub availabilities: Vec<Availability>,
}

/// Validated schedule form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleForm {
    pub timezone: String,
    pub availabilities: Vec<Availability>,
}
