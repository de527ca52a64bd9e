use chrono::{DateTime, Offset, Utc};
use chrono_tz::Tz;

/// Turn `H:MM` into a comparable integer (`9:30` -> 930). Unparseable parts count as 0.
pub fn time_to_int(time: &str) -> u32 {
    let (hours, minutes) = time.split_once(':').unwrap_or((time, "0"));
    let hours: u32 = hours.trim().parse().unwrap_or(0);
    let minutes: u32 = minutes.trim().parse().unwrap_or(0);
    hours * 100 + minutes
}

/// Human readable duration shown on event cards: `1 hr 30 mins`.
pub fn format_event_description(duration_minutes: i64) -> String {
    let hours = duration_minutes / 60;
    let minutes = duration_minutes % 60;

    let minutes_str = format!("{} {}", minutes, if minutes > 1 { "mins" } else { "min" });
    let hours_str = format!("{} {}", hours, if hours > 1 { "hrs" } else { "hr" });

    if hours == 0 {
        minutes_str
    } else if minutes == 0 {
        hours_str
    } else {
        format!("{} {}", hours_str, minutes_str)
    }
}

/// Offset label of `timezone` at `at`, e.g. `GMT`, `GMT+2`, `GMT-3:30`.
pub fn format_timezone_offset_at(timezone: Tz, at: DateTime<Utc>) -> String {
    let seconds = at.with_timezone(&timezone).offset().fix().local_minus_utc();
    if seconds == 0 {
        return "GMT".to_string();
    }

    let sign = if seconds < 0 { '-' } else { '+' };
    let total_minutes = seconds.abs() / 60;
    let (hours, minutes) = (total_minutes / 60, total_minutes % 60);

    if minutes == 0 {
        format!("GMT{}{}", sign, hours)
    } else {
        format!("GMT{}{}:{:02}", sign, hours, minutes)
    }
}

pub fn format_timezone_offset(timezone: Tz) -> String {
    format_timezone_offset_at(timezone, Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn time_to_int_orders_times() {
        assert_eq!(time_to_int("9:30"), 930);
        assert_eq!(time_to_int("09:05"), 905);
        assert_eq!(time_to_int("17:00"), 1700);
        assert!(time_to_int("9:59") < time_to_int("10:00"));
    }

    #[test]
    fn event_description() {
        assert_eq!(format_event_description(1), "1 min");
        assert_eq!(format_event_description(45), "45 mins");
        assert_eq!(format_event_description(60), "1 hr");
        assert_eq!(format_event_description(120), "2 hrs");
        assert_eq!(format_event_description(90), "1 hr 30 mins");
        assert_eq!(format_event_description(721), "12 hrs 1 min");
    }

    #[test]
    fn timezone_offsets() {
        let winter = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
        let summer = Utc.with_ymd_and_hms(2024, 7, 15, 12, 0, 0).unwrap();

        assert_eq!(format_timezone_offset_at(chrono_tz::UTC, winter), "GMT");
        assert_eq!(format_timezone_offset_at(chrono_tz::Europe::Berlin, winter), "GMT+1");
        assert_eq!(format_timezone_offset_at(chrono_tz::Europe::Berlin, summer), "GMT+2");
        assert_eq!(
            format_timezone_offset_at(chrono_tz::America::St_Johns, winter),
            "GMT-3:30"
        );
        assert_eq!(
            format_timezone_offset_at(chrono_tz::Asia::Kolkata, summer),
            "GMT+5:30"
        );
    }
}
