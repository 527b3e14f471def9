use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::db::queries;
use crate::errors::AppError;
use crate::handlers::authenticate;
use crate::models::availability::normalize_time;
use crate::models::{AvailabilitySlot, DayOfWeek, Role};
use crate::state::AppState;

// GET /availability/:therapist_id
#[derive(Serialize)]
pub struct AvailabilityResponse {
    pub weekday: Vec<AvailabilitySlot>,
    pub weekend: Vec<AvailabilitySlot>,
}

pub async fn get_availability(
    State(state): State<Arc<AppState>>,
    Path(therapist_id): Path<String>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    let slots = {
        let db = state.db.lock().unwrap();
        if queries::get_user_by_id(&db, &therapist_id)?.is_none() {
            return Err(AppError::NotFound("therapist not found".to_string()));
        }
        queries::get_availability(&db, &therapist_id)?
    };

    let (weekday, weekend) = slots.into_iter().partition(|s: &AvailabilitySlot| s.is_weekday);
    Ok(Json(AvailabilityResponse { weekday, weekend }))
}

// POST /availability
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertAvailabilityRequest {
    pub user_id: String,
    pub availabilities: Vec<SlotInput>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotInput {
    pub day_of_week: String,
    pub start_time: String,
    pub end_time: String,
    pub is_available: bool,
}

pub async fn upsert_availability(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<UpsertAvailabilityRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let db = state.db.lock().unwrap();
    let caller = authenticate(&headers, &db)?;

    // Therapists manage their own template; admins may edit anyone's.
    if caller.role != Role::Admin && caller.id != body.user_id {
        return Err(AppError::Forbidden);
    }

    let target = queries::get_user_by_id(&db, &body.user_id)?
        .ok_or_else(|| AppError::NotFound("therapist not found".to_string()))?;
    if target.role != Role::Therapist {
        return Err(AppError::Validation(
            "availability templates belong to therapists".to_string(),
        ));
    }

    let mut slots = Vec::with_capacity(body.availabilities.len());
    for input in &body.availabilities {
        let day = DayOfWeek::parse(&input.day_of_week).ok_or_else(|| {
            AppError::Validation(format!("unknown day of week: {}", input.day_of_week))
        })?;
        let start_time = normalize_time(&input.start_time)
            .ok_or_else(|| AppError::Validation(format!("invalid time: {}", input.start_time)))?;
        let end_time = normalize_time(&input.end_time)
            .ok_or_else(|| AppError::Validation(format!("invalid time: {}", input.end_time)))?;
        if end_time <= start_time {
            return Err(AppError::Validation(
                "end time must be after start time".to_string(),
            ));
        }

        slots.push(AvailabilitySlot {
            id: uuid::Uuid::new_v4().to_string(),
            therapist_id: body.user_id.clone(),
            day_of_week: day,
            is_weekday: day.is_weekday(),
            start_time,
            end_time,
            is_available: input.is_available,
        });
    }

    queries::replace_availability(&db, &body.user_id, &slots)?;

    tracing::info!(
        "replaced availability template for {} ({} slots)",
        body.user_id,
        slots.len()
    );
    Ok(Json(serde_json::json!({"ok": true, "count": slots.len()})))
}
