use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;

use crate::errors::AppError;
use crate::handlers::authenticate;
use crate::models::User;
use crate::state::AppState;

// GET /profile
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<User>, AppError> {
    let db = state.db.lock().unwrap();
    let user = authenticate(&headers, &db)?;
    Ok(Json(user))
}
