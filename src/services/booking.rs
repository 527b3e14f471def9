use chrono::{Datelike, NaiveDate, Utc};
use rusqlite::Connection;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::availability::normalize_time;
use crate::models::{Booking, BookingStatus, DayOfWeek, Role, TherapistStatus};

#[derive(Debug)]
pub enum BookingError {
    SlotNotFound,
    TherapistUnavailable,
    SlotUnavailable,
    DayMismatch { expected: DayOfWeek },
    DateInPast,
    BadTime,
    Conflict,
}

impl std::fmt::Display for BookingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BookingError::SlotNotFound => write!(f, "availability slot not found"),
            BookingError::TherapistUnavailable => {
                write!(f, "this therapist is not accepting bookings")
            }
            BookingError::SlotUnavailable => {
                write!(f, "that slot is not offered for booking")
            }
            BookingError::DayMismatch { expected } => {
                write!(
                    f,
                    "the chosen date does not fall on a {}",
                    expected.as_str()
                )
            }
            BookingError::DateInPast => write!(f, "the chosen date is in the past"),
            BookingError::BadTime => write!(f, "invalid start or end time"),
            BookingError::Conflict => {
                write!(f, "that time slot is already booked for this date")
            }
        }
    }
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::SlotNotFound => AppError::NotFound(err.to_string()),
            BookingError::Conflict => AppError::Conflict(err.to_string()),
            _ => AppError::Validation(err.to_string()),
        }
    }
}

pub struct BookingRequest {
    pub therapist_id: String,
    pub availability_id: String,
    pub booking_date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub session_type: String,
}

/// Creates a confirmed booking after checking the slot against its template
/// row and existing bookings. Holds the one invariant the clients rely on:
/// at most one active booking per (therapist, date, start time).
pub fn place_booking(
    conn: &Connection,
    customer_id: &str,
    req: &BookingRequest,
) -> Result<Booking, AppError> {
    // Only approved therapists can be booked; pending, suspended and
    // rejected accounts drop out of the flow here.
    let therapist = queries::get_user_by_id(conn, &req.therapist_id)?
        .filter(|u| u.role == Role::Therapist)
        .ok_or(BookingError::SlotNotFound)?;
    if therapist.status != TherapistStatus::Active {
        return Err(BookingError::TherapistUnavailable.into());
    }

    let slot = queries::get_availability_slot(conn, &req.availability_id)?
        .ok_or(BookingError::SlotNotFound)?;

    if slot.therapist_id != req.therapist_id {
        return Err(BookingError::SlotNotFound.into());
    }
    if !slot.is_available {
        return Err(BookingError::SlotUnavailable.into());
    }

    let day = DayOfWeek::from_weekday(req.booking_date.weekday());
    if day != slot.day_of_week {
        return Err(BookingError::DayMismatch {
            expected: slot.day_of_week,
        }
        .into());
    }

    let today = Utc::now().date_naive();
    if req.booking_date < today {
        return Err(BookingError::DateInPast.into());
    }

    let start_time = normalize_time(&req.start_time).ok_or(BookingError::BadTime)?;
    let end_time = normalize_time(&req.end_time).ok_or(BookingError::BadTime)?;

    if queries::has_active_booking(conn, &req.therapist_id, req.booking_date, &start_time)? {
        return Err(BookingError::Conflict.into());
    }

    let booking = Booking {
        id: uuid::Uuid::new_v4().to_string(),
        therapist_id: req.therapist_id.clone(),
        customer_id: customer_id.to_string(),
        availability_id: req.availability_id.clone(),
        booking_date: req.booking_date,
        start_time,
        end_time,
        session_type: req.session_type.clone(),
        status: BookingStatus::Confirmed,
        created_at: Utc::now().naive_utc(),
    };
    queries::create_booking(conn, &booking)?;

    Ok(booking)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::models::{AvailabilitySlot, Role, TherapistStatus, User};
    use chrono::Duration;

    fn setup() -> Connection {
        let conn = db::init_db(":memory:").unwrap();

        for (id, role) in [("t-1", Role::Therapist), ("c-1", Role::Customer)] {
            let user = User {
                id: id.to_string(),
                name: id.to_string(),
                email: format!("{id}@example.com"),
                phone: None,
                role,
                password_hash: "x".to_string(),
                specialty: None,
                license_number: None,
                years_of_experience: None,
                session_fee: None,
                status: TherapistStatus::Active,
            };
            queries::create_user(&conn, &user).unwrap();
        }
        conn
    }

    // A date in the future guaranteed to land on the wanted weekday.
    fn next_date_on(day: DayOfWeek) -> NaiveDate {
        let mut date = Utc::now().date_naive() + Duration::days(1);
        while DayOfWeek::from_weekday(date.weekday()) != day {
            date += Duration::days(1);
        }
        date
    }

    fn install_monday_slot(conn: &Connection) {
        let slot = AvailabilitySlot {
            id: "av-1".to_string(),
            therapist_id: "t-1".to_string(),
            day_of_week: DayOfWeek::Monday,
            is_weekday: true,
            start_time: "09:00:00".to_string(),
            end_time: "10:00:00".to_string(),
            is_available: true,
        };
        queries::replace_availability(conn, "t-1", &[slot]).unwrap();
    }

    fn request(date: NaiveDate) -> BookingRequest {
        BookingRequest {
            therapist_id: "t-1".to_string(),
            availability_id: "av-1".to_string(),
            booking_date: date,
            start_time: "09:00".to_string(),
            end_time: "10:00".to_string(),
            session_type: "video".to_string(),
        }
    }

    #[test]
    fn test_place_booking_succeeds() {
        let conn = setup();
        install_monday_slot(&conn);

        let booking =
            place_booking(&conn, "c-1", &request(next_date_on(DayOfWeek::Monday))).unwrap();
        assert_eq!(booking.start_time, "09:00:00");
        assert_eq!(booking.status, BookingStatus::Confirmed);

        let times =
            queries::booked_start_times(&conn, "t-1", booking.booking_date).unwrap();
        assert_eq!(times, vec!["09:00:00".to_string()]);
    }

    #[test]
    fn test_duplicate_slot_conflicts() {
        let conn = setup();
        install_monday_slot(&conn);
        let date = next_date_on(DayOfWeek::Monday);

        place_booking(&conn, "c-1", &request(date)).unwrap();
        let err = place_booking(&conn, "c-1", &request(date)).unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[test]
    fn test_wrong_weekday_rejected() {
        let conn = setup();
        install_monday_slot(&conn);

        let err =
            place_booking(&conn, "c-1", &request(next_date_on(DayOfWeek::Tuesday))).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_unavailable_slot_rejected() {
        let conn = setup();
        let slot = AvailabilitySlot {
            id: "av-1".to_string(),
            therapist_id: "t-1".to_string(),
            day_of_week: DayOfWeek::Monday,
            is_weekday: true,
            start_time: "09:00:00".to_string(),
            end_time: "10:00:00".to_string(),
            is_available: false,
        };
        queries::replace_availability(&conn, "t-1", &[slot]).unwrap();

        let err =
            place_booking(&conn, "c-1", &request(next_date_on(DayOfWeek::Monday))).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_unknown_slot_rejected() {
        let conn = setup();
        let err =
            place_booking(&conn, "c-1", &request(next_date_on(DayOfWeek::Monday))).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_unapproved_therapist_not_bookable() {
        let conn = setup();
        install_monday_slot(&conn);

        for status in [
            TherapistStatus::Pending,
            TherapistStatus::Suspended,
            TherapistStatus::Inactive,
        ] {
            queries::set_therapist_status(&conn, "t-1", status).unwrap();
            let err = place_booking(&conn, "c-1", &request(next_date_on(DayOfWeek::Monday)))
                .unwrap_err();
            assert!(matches!(err, AppError::Validation(_)), "{status:?}");
        }

        queries::set_therapist_status(&conn, "t-1", TherapistStatus::Active).unwrap();
        place_booking(&conn, "c-1", &request(next_date_on(DayOfWeek::Monday))).unwrap();
    }

    #[test]
    fn test_past_date_rejected() {
        let conn = setup();
        install_monday_slot(&conn);

        let mut date = Utc::now().date_naive() - Duration::days(7);
        while DayOfWeek::from_weekday(date.weekday()) != DayOfWeek::Monday {
            date -= Duration::days(1);
        }

        let err = place_booking(&conn, "c-1", &request(date)).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_cancelled_booking_frees_slot() {
        let conn = setup();
        install_monday_slot(&conn);
        let date = next_date_on(DayOfWeek::Monday);

        let booking = place_booking(&conn, "c-1", &request(date)).unwrap();
        assert!(queries::cancel_booking(&conn, &booking.id).unwrap());

        // Slot can be taken again
        place_booking(&conn, "c-1", &request(date)).unwrap();
    }
}
