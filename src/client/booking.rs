use chrono::NaiveDate;
use serde::Serialize;

use crate::client::http::{ApiClient, RequestError};
use crate::models::{AvailabilitySlot, Booking};
use crate::services::scheduling::{self, CalendarDay, DaySlot, SlotState};

/// Template state for the booking screen and the availability editor.
/// There is no synthetic placeholder template: until the server copy
/// arrives nothing can be rendered as bookable or saved back.
#[derive(Debug, Clone, Default)]
pub enum EditorState {
    #[default]
    NotLoaded,
    Loaded(Vec<AvailabilitySlot>),
    Failed,
}

#[derive(Debug)]
pub enum SelectionError {
    MissingSelection,
}

impl std::fmt::Display for SelectionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SelectionError::MissingSelection => {
                write!(f, "Please select a date and a time slot first")
            }
        }
    }
}

#[derive(Debug)]
pub enum SubmitError {
    Selection(SelectionError),
    Request(RequestError),
}

impl std::fmt::Display for SubmitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubmitError::Selection(e) => write!(f, "{e}"),
            SubmitError::Request(RequestError::Status { message, .. }) if !message.is_empty() => {
                write!(f, "{message}")
            }
            SubmitError::Request(_) => write!(f, "Booking failed. Please try again."),
        }
    }
}

/// The POST /bookings body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingPayload {
    pub therapist_id: String,
    pub availability_id: String,
    pub booking_date: String,
    pub start_time: String,
    pub end_time: String,
    pub session_type: String,
}

/// Generation counter for the booked-slots fetch. Each new date selection
/// invalidates earlier tickets, so a slow stale response can never
/// overwrite the slot list of a newer selection.
#[derive(Debug, Default)]
pub struct FetchGuard {
    current: u64,
}

impl FetchGuard {
    pub fn begin(&mut self) -> u64 {
        self.current += 1;
        self.current
    }

    pub fn accept(&self, ticket: u64) -> bool {
        ticket == self.current
    }
}

/// View-state of the booking screen: the therapist's weekly template mapped
/// onto a rolling 30-day calendar, plus the user's current selections.
pub struct SlotPicker {
    therapist_id: String,
    today: NaiveDate,
    template: EditorState,
    selected_date: Option<NaiveDate>,
    selected_slot: Option<AvailabilitySlot>,
    booked: Vec<String>,
    fetches: FetchGuard,
}

impl SlotPicker {
    pub fn new(therapist_id: impl Into<String>, today: NaiveDate) -> Self {
        Self {
            therapist_id: therapist_id.into(),
            today,
            template: EditorState::NotLoaded,
            selected_date: None,
            selected_slot: None,
            booked: vec![],
            fetches: FetchGuard::default(),
        }
    }

    pub fn template_loaded(&mut self, slots: Vec<AvailabilitySlot>) {
        self.template = EditorState::Loaded(slots);
    }

    pub fn template_failed(&mut self) {
        self.template = EditorState::Failed;
        self.selected_date = None;
        self.selected_slot = None;
        self.booked.clear();
    }

    pub fn load_failed(&self) -> bool {
        matches!(self.template, EditorState::Failed)
    }

    pub fn calendar(&self) -> Vec<CalendarDay> {
        match &self.template {
            EditorState::Loaded(slots) => scheduling::build_calendar(slots, self.today),
            EditorState::NotLoaded | EditorState::Failed => {
                scheduling::disabled_calendar(self.today)
            }
        }
    }

    /// Selects a calendar date. Returns a fetch ticket for the booked-slots
    /// request this selection triggers, or `None` when the date is not
    /// bookable (taps on disabled dates do nothing).
    pub fn select_date(&mut self, date: NaiveDate) -> Option<u64> {
        let bookable = self
            .calendar()
            .iter()
            .any(|d| d.date == date && d.bookable);
        if !bookable {
            return None;
        }

        self.selected_date = Some(date);
        self.selected_slot = None;
        self.booked.clear();
        Some(self.fetches.begin())
    }

    /// Applies a booked-slots response. Stale responses (tickets from a
    /// superseded date selection) are dropped and `false` is returned.
    pub fn apply_booked_slots(&mut self, ticket: u64, times: Vec<String>) -> bool {
        if !self.fetches.accept(ticket) {
            tracing::debug!("dropping stale booked-slots response (ticket {ticket})");
            return false;
        }
        self.booked = times;
        true
    }

    /// Slots rendered for the selected date; empty when no date is selected
    /// or the template is not loaded.
    pub fn visible_slots(&self) -> Vec<DaySlot> {
        let (EditorState::Loaded(slots), Some(date)) = (&self.template, self.selected_date)
        else {
            return vec![];
        };
        scheduling::slots_for_date(slots, date, &self.booked)
    }

    /// Selects a slot from the rendered list; booked slots are visible but
    /// not selectable.
    pub fn select_slot(&mut self, slot: &DaySlot) -> bool {
        if slot.state != SlotState::Open {
            return false;
        }
        self.selected_slot = Some(slot.slot.clone());
        true
    }

    /// Builds the booking payload. Fails locally when either selection is
    /// missing; callers must not issue a request in that case.
    pub fn submission(&self, session_type: &str) -> Result<BookingPayload, SelectionError> {
        let (Some(date), Some(slot)) = (self.selected_date, &self.selected_slot) else {
            return Err(SelectionError::MissingSelection);
        };

        Ok(BookingPayload {
            therapist_id: self.therapist_id.clone(),
            availability_id: slot.id.clone(),
            booking_date: date.format("%Y-%m-%d").to_string(),
            start_time: slot.start_time.clone(),
            end_time: slot.end_time.clone(),
            session_type: session_type.to_string(),
        })
    }

    /// Submits the booking. With an incomplete selection this returns the
    /// validation error without touching the network.
    pub async fn submit(
        &self,
        client: &ApiClient,
        session_type: &str,
    ) -> Result<Booking, SubmitError> {
        let payload = self.submission(session_type).map_err(SubmitError::Selection)?;
        client
            .post("/bookings", &payload)
            .await
            .map_err(SubmitError::Request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DayOfWeek;

    fn slot(id: &str, day: DayOfWeek, start: &str, end: &str) -> AvailabilitySlot {
        AvailabilitySlot {
            id: id.to_string(),
            therapist_id: "t-1".to_string(),
            day_of_week: day,
            is_weekday: day.is_weekday(),
            start_time: start.to_string(),
            end_time: end.to_string(),
            is_available: true,
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    // 2025-06-16 is a Monday
    fn monday_picker() -> SlotPicker {
        let mut picker = SlotPicker::new("t-1", date("2025-06-16"));
        picker.template_loaded(vec![
            slot("av-9", DayOfWeek::Monday, "09:00:00", "10:00:00"),
            slot("av-14", DayOfWeek::Monday, "14:00:00", "15:00:00"),
            slot("av-11", DayOfWeek::Monday, "11:00:00", "12:00:00"),
        ]);
        picker
    }

    #[test]
    fn test_calendar_disabled_before_load_and_on_failure() {
        let mut picker = SlotPicker::new("t-1", date("2025-06-16"));
        assert!(picker.calendar().iter().all(|d| !d.bookable));

        picker.template_failed();
        assert!(picker.load_failed());
        assert!(picker.calendar().iter().all(|d| !d.bookable));

        // Tapping a date does nothing and no slot list renders
        assert_eq!(picker.select_date(date("2025-06-16")), None);
        assert!(picker.visible_slots().is_empty());
    }

    #[test]
    fn test_select_date_only_on_bookable_days() {
        let mut picker = monday_picker();

        assert!(picker.select_date(date("2025-06-16")).is_some());
        // 2025-06-17 is a Tuesday with no template rows
        assert_eq!(picker.select_date(date("2025-06-17")), None);
        // Outside the 30-day window
        assert_eq!(picker.select_date(date("2026-01-05")), None);
    }

    #[test]
    fn test_slots_ordered_and_partitioned() {
        let mut picker = monday_picker();
        let ticket = picker.select_date(date("2025-06-16")).unwrap();
        assert!(picker.apply_booked_slots(ticket, vec!["14:00".to_string()]));

        let slots = picker.visible_slots();
        let rendered: Vec<(String, SlotState)> = slots
            .iter()
            .map(|s| {
                (
                    scheduling::truncate_hhmm(&s.slot.start_time).to_string(),
                    s.state,
                )
            })
            .collect();
        assert_eq!(
            rendered,
            vec![
                ("09:00".to_string(), SlotState::Open),
                ("11:00".to_string(), SlotState::Open),
                ("14:00".to_string(), SlotState::Booked),
            ]
        );

        // Booked slot is not selectable
        assert!(!picker.select_slot(&slots[2]));
        assert!(picker.select_slot(&slots[0]));
    }

    #[test]
    fn test_stale_booked_slots_response_dropped() {
        let mut picker = monday_picker();

        let first = picker.select_date(date("2025-06-16")).unwrap();
        let second = picker.select_date(date("2025-06-23")).unwrap();

        // The slow response for the first selection arrives late
        assert!(!picker.apply_booked_slots(first, vec!["09:00".to_string()]));
        assert!(picker.apply_booked_slots(second, vec!["11:00".to_string()]));

        let slots = picker.visible_slots();
        assert_eq!(slots[0].state, SlotState::Open); // 09:00 not booked
        assert_eq!(slots[1].state, SlotState::Booked); // 11:00 booked
    }

    #[test]
    fn test_submission_requires_both_selections() {
        let mut picker = monday_picker();
        assert!(matches!(
            picker.submission("video"),
            Err(SelectionError::MissingSelection)
        ));

        let ticket = picker.select_date(date("2025-06-16")).unwrap();
        picker.apply_booked_slots(ticket, vec![]);
        assert!(matches!(
            picker.submission("video"),
            Err(SelectionError::MissingSelection)
        ));

        let slots = picker.visible_slots();
        picker.select_slot(&slots[0]);
        let payload = picker.submission("video").unwrap();
        assert_eq!(payload.therapist_id, "t-1");
        assert_eq!(payload.availability_id, "av-9");
        assert_eq!(payload.booking_date, "2025-06-16");
        assert_eq!(payload.start_time, "09:00:00");
        assert_eq!(payload.session_type, "video");
    }

    #[test]
    fn test_reselecting_date_clears_slot() {
        let mut picker = monday_picker();
        let ticket = picker.select_date(date("2025-06-16")).unwrap();
        picker.apply_booked_slots(ticket, vec![]);
        let slots = picker.visible_slots();
        picker.select_slot(&slots[0]);

        picker.select_date(date("2025-06-23")).unwrap();
        assert!(matches!(
            picker.submission("video"),
            Err(SelectionError::MissingSelection)
        ));
    }

    #[test]
    fn test_submit_error_messages() {
        let err = SubmitError::Selection(SelectionError::MissingSelection);
        assert_eq!(err.to_string(), "Please select a date and a time slot first");

        let err = SubmitError::Request(RequestError::Status {
            status: 409,
            message: "that time slot is already booked for this date".to_string(),
        });
        assert_eq!(
            err.to_string(),
            "that time slot is already booked for this date"
        );

        let err = SubmitError::Request(RequestError::Status {
            status: 500,
            message: String::new(),
        });
        assert_eq!(err.to_string(), "Booking failed. Please try again.");
    }

    #[test]
    fn test_payload_serializes_camel_case() {
        let payload = BookingPayload {
            therapist_id: "t-1".to_string(),
            availability_id: "av-9".to_string(),
            booking_date: "2025-06-16".to_string(),
            start_time: "09:00:00".to_string(),
            end_time: "10:00:00".to_string(),
            session_type: "video".to_string(),
        };
        let json = serde_json::to_string(&payload).unwrap();
        assert!(json.contains("\"therapistId\":\"t-1\""));
        assert!(json.contains("\"bookingDate\":\"2025-06-16\""));
        assert!(json.contains("\"sessionType\":\"video\""));
    }
}
