use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;

use crate::db::queries;
use crate::errors::AppError;
use crate::handlers::{authenticate, require_admin};
use crate::models::{TherapistStatus, User};
use crate::state::AppState;

// GET /users/pending-therapists
pub async fn pending_therapists(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<User>>, AppError> {
    let db = state.db.lock().unwrap();
    let caller = authenticate(&headers, &db)?;
    require_admin(&caller)?;

    let therapists = queries::list_pending_therapists(&db)?;
    Ok(Json(therapists))
}

// POST /users/:id/approve
pub async fn approve_therapist(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    set_status(&state, &headers, &id, TherapistStatus::Active)
}

// POST /users/:id/reject
pub async fn reject_therapist(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    set_status(&state, &headers, &id, TherapistStatus::Inactive)
}

fn set_status(
    state: &AppState,
    headers: &HeaderMap,
    id: &str,
    status: TherapistStatus,
) -> Result<Json<serde_json::Value>, AppError> {
    let db = state.db.lock().unwrap();
    let caller = authenticate(headers, &db)?;
    require_admin(&caller)?;

    if !queries::set_therapist_status(&db, id, status)? {
        return Err(AppError::NotFound("therapist not found".to_string()));
    }

    tracing::info!("therapist {id} marked {}", status.as_str());
    Ok(Json(serde_json::json!({"ok": true})))
}
