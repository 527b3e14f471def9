use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::db::queries;
use crate::errors::AppError;
use crate::handlers::bearer_token;
use crate::models::{Role, TherapistStatus, User};
use crate::services;
use crate::state::AppState;

// POST /auth/register
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password: String,
    pub role: String,
    pub specialty: Option<String>,
    pub license_number: Option<String>,
    pub years_of_experience: Option<i32>,
    pub session_fee: Option<f64>,
}

#[derive(Serialize)]
pub struct RegisterResponse {
    pub id: String,
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RegisterRequest>,
) -> Result<Json<RegisterResponse>, AppError> {
    if body.name.trim().is_empty() {
        return Err(AppError::Validation("name is required".to_string()));
    }
    if !body.email.contains('@') {
        return Err(AppError::Validation("invalid email address".to_string()));
    }
    if body.password.len() < 8 {
        return Err(AppError::Validation(
            "password must be at least 8 characters".to_string(),
        ));
    }

    // Admin accounts are seeded from the environment, never self-registered.
    let role = match Role::parse(&body.role) {
        Some(Role::Customer) => Role::Customer,
        Some(Role::Therapist) => Role::Therapist,
        _ => {
            return Err(AppError::Validation(format!(
                "unknown role: {}",
                body.role
            )))
        }
    };

    // Therapists wait for admin approval
    let status = match role {
        Role::Therapist => TherapistStatus::Pending,
        _ => TherapistStatus::Active,
    };

    let password_hash = services::auth::hash_password(&body.password)?;

    let user = User {
        id: uuid::Uuid::new_v4().to_string(),
        name: body.name,
        email: body.email,
        phone: body.phone,
        role,
        password_hash,
        specialty: body.specialty,
        license_number: body.license_number,
        years_of_experience: body.years_of_experience,
        session_fee: body.session_fee,
        status,
    };

    let db = state.db.lock().unwrap();
    if queries::get_user_by_email(&db, &user.email)?.is_some() {
        return Err(AppError::Conflict("email is already registered".to_string()));
    }
    queries::create_user(&db, &user)?;

    tracing::info!(role = role.as_str(), "registered user {}", user.id);
    Ok(Json(RegisterResponse { id: user.id }))
}

// POST /auth/login
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub role: Role,
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let db = state.db.lock().unwrap();

    let user = queries::get_user_by_email(&db, &body.email)?.ok_or(AppError::Unauthorized)?;
    if !services::auth::verify_password(&body.password, &user.password_hash) {
        return Err(AppError::Unauthorized);
    }

    let token = services::auth::issue_token(&db, &user.id)?;
    Ok(Json(LoginResponse {
        token,
        role: user.role,
    }))
}

// POST /auth/logout
pub async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, AppError> {
    let token = bearer_token(&headers).ok_or(AppError::Unauthorized)?;

    let db = state.db.lock().unwrap();
    services::auth::revoke_token(&db, token)?;

    Ok(Json(serde_json::json!({"ok": true})))
}
