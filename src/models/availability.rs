use chrono::Weekday;
use serde::{Deserialize, Serialize};

/// One row of a therapist's recurring weekly template. Times are stored as
/// `HH:MM:SS` strings; the template carries no calendar date.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilitySlot {
    pub id: String,
    pub therapist_id: String,
    pub day_of_week: DayOfWeek,
    pub is_weekday: bool,
    pub start_time: String,
    pub end_time: String,
    pub is_available: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

const DAY_NAMES: [(DayOfWeek, &str); 7] = [
    (DayOfWeek::Monday, "Monday"),
    (DayOfWeek::Tuesday, "Tuesday"),
    (DayOfWeek::Wednesday, "Wednesday"),
    (DayOfWeek::Thursday, "Thursday"),
    (DayOfWeek::Friday, "Friday"),
    (DayOfWeek::Saturday, "Saturday"),
    (DayOfWeek::Sunday, "Sunday"),
];

impl DayOfWeek {
    pub fn as_str(&self) -> &'static str {
        DAY_NAMES
            .iter()
            .find(|(d, _)| d == self)
            .map(|(_, name)| *name)
            .unwrap_or("Monday")
    }

    pub fn parse(s: &str) -> Option<Self> {
        let lower = s.to_lowercase();
        DAY_NAMES
            .iter()
            .find(|(_, name)| name.to_lowercase() == lower)
            .map(|(d, _)| *d)
    }

    pub fn from_weekday(w: Weekday) -> Self {
        match w {
            Weekday::Mon => DayOfWeek::Monday,
            Weekday::Tue => DayOfWeek::Tuesday,
            Weekday::Wed => DayOfWeek::Wednesday,
            Weekday::Thu => DayOfWeek::Thursday,
            Weekday::Fri => DayOfWeek::Friday,
            Weekday::Sat => DayOfWeek::Saturday,
            Weekday::Sun => DayOfWeek::Sunday,
        }
    }

    pub fn is_weekday(&self) -> bool {
        !matches!(self, DayOfWeek::Saturday | DayOfWeek::Sunday)
    }
}

/// Accepts `HH:MM` or `HH:MM:SS`, validates ranges, returns `HH:MM:SS`.
pub fn normalize_time(s: &str) -> Option<String> {
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() != 2 && parts.len() != 3 {
        return None;
    }

    let hour: u32 = parts[0].parse().ok()?;
    let minute: u32 = parts[1].parse().ok()?;
    let second: u32 = if parts.len() == 3 {
        parts[2].parse().ok()?
    } else {
        0
    };

    if hour > 23 || minute > 59 || second > 59 {
        return None;
    }

    Some(format!("{hour:02}:{minute:02}:{second:02}"))
}
