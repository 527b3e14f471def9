use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;

use crate::db::queries;
use crate::errors::AppError;
use crate::handlers::authenticate;
use crate::models::Rating;
use crate::state::AppState;

// POST /ratings
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRatingRequest {
    pub booking_id: String,
    pub score: i32,
    pub comment: Option<String>,
}

pub async fn create_rating(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<CreateRatingRequest>,
) -> Result<Json<Rating>, AppError> {
    if !(1..=5).contains(&body.score) {
        return Err(AppError::Validation(
            "score must be between 1 and 5".to_string(),
        ));
    }

    let db = state.db.lock().unwrap();
    let caller = authenticate(&headers, &db)?;

    let booking = queries::get_booking_by_id(&db, &body.booking_id)?
        .ok_or_else(|| AppError::NotFound("booking not found".to_string()))?;
    if booking.customer_id != caller.id {
        return Err(AppError::Forbidden);
    }

    let rating = Rating {
        id: uuid::Uuid::new_v4().to_string(),
        booking_id: body.booking_id,
        customer_id: caller.id,
        score: body.score,
        comment: body.comment,
        created_at: Utc::now().naive_utc(),
    };
    queries::create_rating(&db, &rating)?;

    Ok(Json(rating))
}
