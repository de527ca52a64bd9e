//! Form schemas for events and schedules.
//!
//! Payloads arrive as loosely typed input (every field optional, numbers
//! possibly sent as strings). Parsing either yields the validated form or the
//! full list of field errors, keyed by path (`availabilities.2.endTime`).

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::db::models::{Availability, DayOfWeek, EventForm, ScheduleForm};
use crate::services::formatters::time_to_int;

pub const MAX_DURATION_MINUTES: i64 = 60 * 12;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub path: String,
    pub message: String,
}

impl FieldError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

// ============================================================================
// Event form
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventFormInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
    pub duration_in_minutes: Option<serde_json::Value>,
}

pub fn parse_event_form(input: EventFormInput) -> Result<EventForm, Vec<FieldError>> {
    let mut errors = Vec::new();

    let name = match input.name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => {
            errors.push(FieldError::new("name", "Required"));
            String::new()
        }
    };

    let description = input
        .description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty());

    let duration_minutes = match input.duration_in_minutes.as_ref().map(coerce_integer) {
        None => {
            errors.push(FieldError::new("durationInMinutes", "Required"));
            0
        }
        Some(None) => {
            errors.push(FieldError::new("durationInMinutes", "Expected a whole number"));
            0
        }
        Some(Some(minutes)) if minutes <= 0 => {
            errors.push(FieldError::new(
                "durationInMinutes",
                "Duration must be greater than 0",
            ));
            minutes
        }
        Some(Some(minutes)) if minutes > MAX_DURATION_MINUTES => {
            errors.push(FieldError::new(
                "durationInMinutes",
                format!(
                    "Duration must be less than 12 hours ({} minutes)",
                    MAX_DURATION_MINUTES
                ),
            ));
            minutes
        }
        Some(Some(minutes)) => minutes,
    };

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(EventForm {
        name,
        description,
        is_active: input.is_active.unwrap_or(true),
        duration_minutes,
    })
}

/// Accept `45`, `45.0` and `"45"`; reject fractions and anything else.
fn coerce_integer(value: &serde_json::Value) -> Option<i64> {
    match value {
        serde_json::Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        serde_json::Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

// ============================================================================
// Schedule form
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleFormInput {
    pub timezone: Option<String>,
    pub availabilities: Option<Vec<AvailabilityInput>>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityInput {
    pub day_of_week: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

pub fn parse_schedule_form(input: ScheduleFormInput) -> Result<ScheduleForm, Vec<FieldError>> {
    let mut errors = Vec::new();

    let timezone = input.timezone.unwrap_or_default().trim().to_string();
    if timezone.is_empty() {
        errors.push(FieldError::new("timezone", "Required"));
    } else if timezone.parse::<Tz>().is_err() {
        errors.push(FieldError::new("timezone", "Unknown timezone"));
    }

    let Some(raw) = input.availabilities else {
        errors.push(FieldError::new("availabilities", "Required"));
        return Err(errors);
    };

    // Field-level checks first; rows that fail them are skipped by the
    // cross-row rules below.
    let mut parsed: Vec<Option<Availability>> = Vec::with_capacity(raw.len());
    for (index, item) in raw.into_iter().enumerate() {
        let path = |field: &str| format!("availabilities.{}.{}", index, field);
        let mut row_ok = true;

        let day_of_week = item.day_of_week.as_deref().and_then(DayOfWeek::from_str);
        if day_of_week.is_none() {
            errors.push(FieldError::new(path("dayOfWeek"), "Invalid day of week"));
            row_ok = false;
        }

        for (field, value) in [("startTime", &item.start_time), ("endTime", &item.end_time)] {
            if !value.as_deref().is_some_and(is_valid_time) {
                errors.push(FieldError::new(
                    path(field),
                    "Time must be in the format HH:MM",
                ));
                row_ok = false;
            }
        }

        parsed.push(match (row_ok, day_of_week) {
            (true, Some(day_of_week)) => Some(Availability {
                day_of_week,
                start_time: item.start_time.unwrap_or_default(),
                end_time: item.end_time.unwrap_or_default(),
            }),
            _ => None,
        });
    }

    for (index, availability) in parsed.iter().enumerate() {
        let Some(a) = availability else { continue };

        if time_to_int(&a.end_time) <= time_to_int(&a.start_time) {
            errors.push(FieldError::new(
                format!("availabilities.{}.endTime", index),
                "End time must be after start time",
            ));
        }

        let overlaps = parsed.iter().enumerate().any(|(other_index, other)| {
            other_index != index
                && other
                    .as_ref()
                    .is_some_and(|b| b.day_of_week == a.day_of_week && windows_overlap(a, b))
        });
        if overlaps {
            errors.push(FieldError::new(
                format!("availabilities.{}", index),
                "Availability overlaps with another",
            ));
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(ScheduleForm {
        timezone,
        availabilities: parsed.into_iter().flatten().collect(),
    })
}

/// `H:MM` or `HH:MM`, hours 0-23, minutes 00-59.
pub fn is_valid_time(value: &str) -> bool {
    let Some((hours, minutes)) = value.split_once(':') else {
        return false;
    };

    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(hours) || !all_digits(minutes) || hours.len() > 2 || minutes.len() != 2 {
        return false;
    }

    matches!(hours.parse::<u32>(), Ok(h) if h <= 23) && matches!(minutes.parse::<u32>(), Ok(m) if m <= 59)
}

/// Half-open windows: touching end and start do not overlap.
fn windows_overlap(a: &Availability, b: &Availability) -> bool {
    let (a_start, a_end) = (time_to_int(&a.start_time), time_to_int(&a.end_time));
    let (b_start, b_end) = (time_to_int(&b.start_time), time_to_int(&b.end_time));
    a_start < b_end && b_start < a_end
}
