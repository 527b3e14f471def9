use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;

use crate::db::queries;
use crate::errors::AppError;
use crate::handlers::authenticate;
use crate::models::{Booking, Role};
use crate::services::booking::{place_booking, BookingRequest};
use crate::state::AppState;

// POST /bookings
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub therapist_id: String,
    pub availability_id: String,
    pub booking_date: String,
    pub start_time: String,
    pub end_time: String,
    pub session_type: String,
}

pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<CreateBookingRequest>,
) -> Result<Json<Booking>, AppError> {
    let booking_date = NaiveDate::parse_from_str(&body.booking_date, "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("invalid booking date: {}", body.booking_date)))?;

    let db = state.db.lock().unwrap();
    let caller = authenticate(&headers, &db)?;

    let req = BookingRequest {
        therapist_id: body.therapist_id,
        availability_id: body.availability_id,
        booking_date,
        start_time: body.start_time,
        end_time: body.end_time,
        session_type: body.session_type,
    };

    let booking = place_booking(&db, &caller.id, &req)?;

    tracing::info!(
        "booking {} created: therapist {} on {} at {}",
        booking.id,
        booking.therapist_id,
        booking.booking_date,
        booking.start_time
    );
    Ok(Json(booking))
}

// GET /bookings
pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Booking>>, AppError> {
    let db = state.db.lock().unwrap();
    let caller = authenticate(&headers, &db)?;

    let bookings = queries::bookings_for_user(&db, &caller.id)?;
    Ok(Json(bookings))
}

// GET /bookings/booked-slots?therapistId=...&date=YYYY-MM-DD
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookedSlotsQuery {
    pub therapist_id: String,
    pub date: String,
}

pub async fn booked_slots(
    State(state): State<Arc<AppState>>,
    Query(query): Query<BookedSlotsQuery>,
) -> Result<Json<Vec<String>>, AppError> {
    let date = NaiveDate::parse_from_str(&query.date, "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("invalid date: {}", query.date)))?;

    let db = state.db.lock().unwrap();
    let times = queries::booked_start_times(&db, &query.therapist_id, date)?;
    Ok(Json(times))
}

// POST /bookings/:id/cancel
pub async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let db = state.db.lock().unwrap();
    let caller = authenticate(&headers, &db)?;

    let booking = queries::get_booking_by_id(&db, &id)?
        .ok_or_else(|| AppError::NotFound("booking not found".to_string()))?;

    let involved = booking.customer_id == caller.id || booking.therapist_id == caller.id;
    if caller.role != Role::Admin && !involved {
        return Err(AppError::Forbidden);
    }

    if !queries::cancel_booking(&db, &id)? {
        return Err(AppError::Conflict("booking is already cancelled".to_string()));
    }

    tracing::info!("booking {id} cancelled by {}", caller.id);
    Ok(Json(serde_json::json!({"ok": true})))
}
