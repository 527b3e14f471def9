use chrono::{Datelike, Duration, NaiveDate};

use crate::models::{AvailabilitySlot, DayOfWeek};

/// Length of the rolling booking window shown to customers.
pub const CALENDAR_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub bookable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    Open,
    Booked,
}

#[derive(Debug, Clone)]
pub struct DaySlot {
    pub slot: AvailabilitySlot,
    pub state: SlotState,
}

/// Drops the seconds component; booked-time comparison is minute-granular.
pub fn truncate_hhmm(time: &str) -> &str {
    time.get(..5).unwrap_or(time)
}

/// Maps a recurring weekly template onto the next `CALENDAR_WINDOW_DAYS`
/// calendar dates starting at `today`. A date is bookable iff at least one
/// template row for its weekday is flagged available.
pub fn build_calendar(template: &[AvailabilitySlot], today: NaiveDate) -> Vec<CalendarDay> {
    (0..CALENDAR_WINDOW_DAYS)
        .map(|i| {
            let date = today + Duration::days(i);
            let day = DayOfWeek::from_weekday(date.weekday());
            let bookable = template
                .iter()
                .any(|slot| slot.day_of_week == day && slot.is_available);
            CalendarDay { date, bookable }
        })
        .collect()
}

/// The calendar rendered when the template could not be loaded: every date
/// disabled.
pub fn disabled_calendar(today: NaiveDate) -> Vec<CalendarDay> {
    (0..CALENDAR_WINDOW_DAYS)
        .map(|i| CalendarDay {
            date: today + Duration::days(i),
            bookable: false,
        })
        .collect()
}

/// Template rows offered for a selected date: rows matching the date's
/// weekday with `is_available`, sorted by start time, each marked open or
/// booked against the already-booked start times for that date.
pub fn slots_for_date(
    template: &[AvailabilitySlot],
    date: NaiveDate,
    booked_start_times: &[String],
) -> Vec<DaySlot> {
    let day = DayOfWeek::from_weekday(date.weekday());

    let mut slots: Vec<AvailabilitySlot> = template
        .iter()
        .filter(|slot| slot.day_of_week == day && slot.is_available)
        .cloned()
        .collect();
    slots.sort_by(|a, b| a.start_time.cmp(&b.start_time));

    slots
        .into_iter()
        .map(|slot| {
            let start = truncate_hhmm(&slot.start_time);
            let state = if booked_start_times
                .iter()
                .any(|t| truncate_hhmm(t) == start)
            {
                SlotState::Booked
            } else {
                SlotState::Open
            };
            DaySlot { slot, state }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(day: DayOfWeek, start: &str, end: &str, available: bool) -> AvailabilitySlot {
        AvailabilitySlot {
            id: format!("slot-{}-{start}", day.as_str()),
            therapist_id: "t-1".to_string(),
            day_of_week: day,
            is_weekday: day.is_weekday(),
            start_time: start.to_string(),
            end_time: end.to_string(),
            is_available: available,
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_calendar_marks_matching_weekdays_bookable() {
        // Mondays only
        let template = vec![slot(DayOfWeek::Monday, "09:00:00", "10:00:00", true)];
        // 2025-06-16 is a Monday
        let calendar = build_calendar(&template, date("2025-06-16"));

        assert_eq!(calendar.len(), 30);
        for (i, day) in calendar.iter().enumerate() {
            let expected = i % 7 == 0;
            assert_eq!(
                day.bookable, expected,
                "day offset {i} ({}) bookable mismatch",
                day.date
            );
        }
    }

    #[test]
    fn test_calendar_ignores_unavailable_rows() {
        let template = vec![slot(DayOfWeek::Monday, "09:00:00", "10:00:00", false)];
        let calendar = build_calendar(&template, date("2025-06-16"));
        assert!(calendar.iter().all(|d| !d.bookable));
    }

    #[test]
    fn test_calendar_mixed_rows_one_available_suffices() {
        let template = vec![
            slot(DayOfWeek::Tuesday, "09:00:00", "10:00:00", false),
            slot(DayOfWeek::Tuesday, "14:00:00", "15:00:00", true),
        ];
        // 2025-06-17 is a Tuesday
        let calendar = build_calendar(&template, date("2025-06-17"));
        assert!(calendar[0].bookable);
        assert!(!calendar[1].bookable);
        assert!(calendar[7].bookable);
    }

    #[test]
    fn test_disabled_calendar_all_disabled() {
        let calendar = disabled_calendar(date("2025-06-16"));
        assert_eq!(calendar.len(), 30);
        assert!(calendar.iter().all(|d| !d.bookable));
    }

    #[test]
    fn test_slots_sorted_by_start_time() {
        let template = vec![
            slot(DayOfWeek::Monday, "09:00:00", "10:00:00", true),
            slot(DayOfWeek::Monday, "14:00:00", "15:00:00", true),
            slot(DayOfWeek::Monday, "11:00:00", "12:00:00", true),
        ];
        let slots = slots_for_date(&template, date("2025-06-16"), &[]);

        let starts: Vec<&str> = slots
            .iter()
            .map(|s| truncate_hhmm(&s.slot.start_time))
            .collect();
        assert_eq!(starts, vec!["09:00", "11:00", "14:00"]);
    }

    #[test]
    fn test_booked_slot_marked_booked_but_retained() {
        let template = vec![
            slot(DayOfWeek::Monday, "09:00:00", "10:00:00", true),
            slot(DayOfWeek::Monday, "11:00:00", "12:00:00", true),
            slot(DayOfWeek::Monday, "14:00:00", "15:00:00", true),
        ];
        let booked = vec!["14:00".to_string()];
        let slots = slots_for_date(&template, date("2025-06-16"), &booked);

        assert_eq!(slots.len(), 3);
        assert_eq!(slots[0].state, SlotState::Open);
        assert_eq!(slots[1].state, SlotState::Open);
        assert_eq!(slots[2].state, SlotState::Booked);
    }

    #[test]
    fn test_booked_comparison_ignores_seconds() {
        let template = vec![slot(DayOfWeek::Monday, "09:00:00", "10:00:00", true)];
        let booked = vec!["09:00:00".to_string()];
        let slots = slots_for_date(&template, date("2025-06-16"), &booked);
        assert_eq!(slots[0].state, SlotState::Booked);
    }

    #[test]
    fn test_wrong_day_rows_not_offered() {
        let template = vec![slot(DayOfWeek::Tuesday, "09:00:00", "10:00:00", true)];
        // Monday selected
        let slots = slots_for_date(&template, date("2025-06-16"), &[]);
        assert!(slots.is_empty());
    }

    #[test]
    fn test_unavailable_rows_not_offered_for_date() {
        let template = vec![
            slot(DayOfWeek::Monday, "09:00:00", "10:00:00", true),
            slot(DayOfWeek::Monday, "11:00:00", "12:00:00", false),
        ];
        let slots = slots_for_date(&template, date("2025-06-16"), &[]);
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].slot.start_time, "09:00:00");
    }

    #[test]
    fn test_truncate_hhmm() {
        assert_eq!(truncate_hhmm("09:00:00"), "09:00");
        assert_eq!(truncate_hhmm("09:00"), "09:00");
        assert_eq!(truncate_hhmm("bad"), "bad");
    }
}
