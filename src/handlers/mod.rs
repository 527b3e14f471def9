pub mod admin;
pub mod auth;
pub mod availability;
pub mod bookings;
pub mod health;
pub mod profile;
pub mod ratings;
pub mod therapists;

use axum::http::HeaderMap;
use rusqlite::Connection;

use crate::errors::AppError;
use crate::models::{Role, User};
use crate::services;

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty())
}

/// Resolves the caller from the Authorization header.
pub fn authenticate(headers: &HeaderMap, conn: &Connection) -> Result<User, AppError> {
    let token = bearer_token(headers).ok_or(AppError::Unauthorized)?;
    services::auth::user_for_token(conn, token)?.ok_or(AppError::Unauthorized)
}

pub fn require_admin(user: &User) -> Result<(), AppError> {
    if user.role == Role::Admin {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}
