use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A concrete, dated reservation consuming one availability template slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: String,
    pub therapist_id: String,
    pub customer_id: String,
    pub availability_id: String,
    pub booking_date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub session_type: String,
    pub status: BookingStatus,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "cancelled" => BookingStatus::Cancelled,
            _ => BookingStatus::Confirmed,
        }
    }
}
