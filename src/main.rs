use std::sync::{Arc, Mutex};

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use telecare::config::AppConfig;
use telecare::db;
use telecare::db::queries;
use telecare::handlers;
use telecare::models::{Role, TherapistStatus, User};
use telecare::services;
use telecare::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let conn = db::init_db(&config.database_url)?;

    // Admin accounts come from the environment, not registration
    if !config.admin_email.is_empty() && !config.admin_password.is_empty() {
        if queries::get_user_by_email(&conn, &config.admin_email)?.is_none() {
            let admin = User {
                id: uuid::Uuid::new_v4().to_string(),
                name: config.admin_name.clone(),
                email: config.admin_email.clone(),
                phone: None,
                role: Role::Admin,
                password_hash: services::auth::hash_password(&config.admin_password)?,
                specialty: None,
                license_number: None,
                years_of_experience: None,
                session_fee: None,
                status: TherapistStatus::Active,
            };
            queries::create_user(&conn, &admin)?;
            tracing::info!("seeded admin account {}", config.admin_email);
        }
    }

    let state = Arc::new(AppState {
        db: Arc::new(Mutex::new(conn)),
        config: config.clone(),
    });

    let app = router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/logout", post(handlers::auth::logout))
        .route("/profile", get(handlers::profile::get_profile))
        .route(
            "/users/pending-therapists",
            get(handlers::admin::pending_therapists),
        )
        .route(
            "/users/:id/approve",
            post(handlers::admin::approve_therapist),
        )
        .route("/users/:id/reject", post(handlers::admin::reject_therapist))
        .route(
            "/availability/:therapist_id",
            get(handlers::availability::get_availability),
        )
        .route(
            "/availability",
            post(handlers::availability::upsert_availability),
        )
        .route(
            "/bookings/booked-slots",
            get(handlers::bookings::booked_slots),
        )
        .route("/bookings", post(handlers::bookings::create_booking))
        .route("/bookings", get(handlers::bookings::list_bookings))
        .route(
            "/bookings/:id/cancel",
            post(handlers::bookings::cancel_booking),
        )
        .route(
            "/therapists/:id/session-fee",
            get(handlers::therapists::session_fee),
        )
        .route(
            "/therapists/:id/ratings",
            get(handlers::therapists::ratings),
        )
        .route("/ratings", post(handlers::ratings::create_rating))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
