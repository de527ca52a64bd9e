use chrono_tz::Tz;
use serde::Serialize;
use sqlx::SqlitePool;

use crate::db::{Availability, DayOfWeek, Schedule, ScheduleRepository, DAYS_OF_WEEK_IN_ORDER};
use crate::error::{AppError, AppResult};
use crate::services::formatters::{format_timezone_offset, time_to_int};
use crate::services::validation::{parse_schedule_form, ScheduleFormInput};

/// Used when a user has not saved a schedule yet.
pub const DEFAULT_TIMEZONE: &str = "UTC";

/// Availability row as the schedule form lays it out: `index` points into the
/// sorted availability list that is submitted back on save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexedAvailability {
    pub index: usize,
    #[serde(flatten)]
    pub availability: Availability,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayGroup {
    pub day_of_week: DayOfWeek,
    pub label: &'static str,
    pub availabilities: Vec<IndexedAvailability>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TimezoneOption {
    pub value: String,
    pub label: String,
}

/// Everything the schedule page renders.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleView {
    pub timezone: String,
    pub availabilities: Vec<Availability>,
    pub days: Vec<DayGroup>,
}

pub struct ScheduleService;

impl ScheduleService {
    /// Validate and persist the whole schedule in one call.
    pub async fn save(
        pool: &SqlitePool,
        user_id: Option<&str>,
        input: ScheduleFormInput,
    ) -> AppResult<Schedule> {
        let user_id = user_id.ok_or(AppError::Unauthorized)?;
        let form = parse_schedule_form(input).map_err(AppError::Validation)?;

        let schedule = ScheduleRepository::save(pool, user_id, &form).await?;
        tracing::info!("Saved schedule for user {}", user_id);
        Ok(schedule)
    }

    /// Load the user's schedule (or defaults) shaped for the schedule form.
    pub async fn view(pool: &SqlitePool, user_id: &str) -> AppResult<ScheduleView> {
        let stored = ScheduleRepository::find_by_owner(pool, user_id).await?;

        let (timezone, availabilities) = match stored {
            Some(s) => (s.schedule.timezone, s.availabilities),
            None => (DEFAULT_TIMEZONE.to_string(), Vec::new()),
        };

        let availabilities = sort_by_start_time(availabilities);
        let days = group_by_day(&availabilities);

        Ok(ScheduleView {
            timezone,
            availabilities,
            days,
        })
    }
}

/// Stable sort on start time, so equal starts keep their stored order.
pub fn sort_by_start_time(mut availabilities: Vec<Availability>) -> Vec<Availability> {
    availabilities.sort_by_key(|a| time_to_int(&a.start_time));
    availabilities
}

/// One group per weekday, Monday first, each keeping the input order.
pub fn group_by_day(availabilities: &[Availability]) -> Vec<DayGroup> {
    DAYS_OF_WEEK_IN_ORDER
        .iter()
        .map(|&day| DayGroup {
            day_of_week: day,
            label: day.short_label(),
            availabilities: availabilities
                .iter()
                .enumerate()
                .filter(|(_, a)| a.day_of_week == day)
                .map(|(index, a)| IndexedAvailability {
                    index,
                    availability: a.clone(),
                })
                .collect(),
        })
        .collect()
}

/// Every IANA zone with its current offset, for the timezone picker.
pub fn timezone_options() -> Vec<TimezoneOption> {
    chrono_tz::TZ_VARIANTS
        .iter()
        .map(|tz: &Tz| TimezoneOption {
            value: tz.name().to_string(),
            label: format!("{} ({})", tz.name(), format_timezone_offset(*tz)),
        })
        .collect()
}
