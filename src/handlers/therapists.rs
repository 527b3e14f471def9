use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::Rating;
use crate::state::AppState;

// GET /therapists/:id/session-fee
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionFeeResponse {
    pub session_fee: Option<f64>,
}

pub async fn session_fee(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionFeeResponse>, AppError> {
    let db = state.db.lock().unwrap();

    let fee = queries::get_session_fee(&db, &id)?
        .ok_or_else(|| AppError::NotFound("therapist not found".to_string()))?;

    Ok(Json(SessionFeeResponse { session_fee: fee }))
}

// GET /therapists/:id/ratings
pub async fn ratings(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Rating>>, AppError> {
    let db = state.db.lock().unwrap();

    if queries::get_user_by_id(&db, &id)?.is_none() {
        return Err(AppError::NotFound("therapist not found".to_string()));
    }

    let ratings = queries::ratings_for_therapist(&db, &id)?;
    Ok(Json(ratings))
}
