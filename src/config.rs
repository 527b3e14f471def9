use std::env;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub admin_email: String,
    pub admin_password: String,
    pub admin_name: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "telecare.db".to_string()),
            admin_email: env::var("ADMIN_EMAIL").unwrap_or_default(),
            admin_password: env::var("ADMIN_PASSWORD").unwrap_or_default(),
            admin_name: env::var("ADMIN_NAME").unwrap_or_else(|_| "Administrator".to_string()),
        }
    }
}
