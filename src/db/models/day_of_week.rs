use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

/// Display order of the schedule form.
pub const DAYS_OF_WEEK_IN_ORDER: [DayOfWeek; 7] = [
    DayOfWeek::Monday,
    DayOfWeek::Tuesday,
    DayOfWeek::Wednesday,
    DayOfWeek::Thursday,
    DayOfWeek::Friday,
    DayOfWeek::Saturday,
    DayOfWeek::Sunday,
];

impl DayOfWeek {
    /// Convert from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "monday" => Some(DayOfWeek::Monday),
            "tuesday" => Some(DayOfWeek::Tuesday),
            "wednesday" => Some(DayOfWeek::Wednesday),
            "thursday" => Some(DayOfWeek::Thursday),
            "friday" => Some(DayOfWeek::Friday),
            "saturday" => Some(DayOfWeek::Saturday),
            "sunday" => Some(DayOfWeek::Sunday),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DayOfWeek::Monday => "monday",
            DayOfWeek::Tuesday => "tuesday",
            DayOfWeek::Wednesday => "wednesday",
            DayOfWeek::Thursday => "thursday",
            DayOfWeek::Friday => "friday",
            DayOfWeek::Saturday => "saturday",
            DayOfWeek::Sunday => "sunday",
        }
    }

    /// Three-letter label shown next to each day row.
    pub fn short_label(self) -> &'static str {
        &self.as_str()[..3]
    }
}

impl From<DayOfWeek> for String {
    fn from(day: DayOfWeek) -> Self {
        day.as_str().to_string()
    }
}

impl TryFrom<String> for DayOfWeek {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_str(&value).ok_or_else(|| format!("Invalid day of week: {}", value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!(DayOfWeek::from_str("Monday"), Some(DayOfWeek::Monday));
        assert_eq!(DayOfWeek::from_str("SUNDAY"), Some(DayOfWeek::Sunday));
        assert_eq!(DayOfWeek::from_str("mon"), None);
    }

    #[test]
    fn order_starts_on_monday() {
        assert_eq!(DAYS_OF_WEEK_IN_ORDER[0], DayOfWeek::Monday);
        assert_eq!(DAYS_OF_WEEK_IN_ORDER[6], DayOfWeek::Sunday);
        assert!(DAYS_OF_WEEK_IN_ORDER.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn short_label_is_three_letters() {
        assert_eq!(DayOfWeek::Wednesday.short_label(), "wed");
    }
}
