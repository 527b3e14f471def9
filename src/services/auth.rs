use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rusqlite::Connection;

use crate::db::queries;
use crate::models::User;

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("failed to hash password: {e}"))?
        .to_string();
    Ok(hash)
}

pub fn verify_password(plain: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok()
}

/// Issues an opaque bearer token for the user. Tokens live until logout;
/// there is no expiry or refresh.
pub fn issue_token(conn: &Connection, user_id: &str) -> anyhow::Result<String> {
    let token = uuid::Uuid::new_v4().to_string();
    queries::insert_token(conn, &token, user_id)?;
    Ok(token)
}

pub fn user_for_token(conn: &Connection, token: &str) -> anyhow::Result<Option<User>> {
    queries::user_for_token(conn, token)
}

pub fn revoke_token(conn: &Connection, token: &str) -> anyhow::Result<bool> {
    queries::delete_token(conn, token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::models::{Role, TherapistStatus};

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("hunter2").unwrap();
        assert!(verify_password("hunter2", &hash));
        assert!(!verify_password("hunter3", &hash));
    }

    #[test]
    fn test_verify_malformed_hash() {
        assert!(!verify_password("anything", "not-a-hash"));
    }

    #[test]
    fn test_token_lifecycle() {
        let conn = db::init_db(":memory:").unwrap();
        let user = User {
            id: "u-1".to_string(),
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            phone: None,
            role: Role::Customer,
            password_hash: "x".to_string(),
            specialty: None,
            license_number: None,
            years_of_experience: None,
            session_fee: None,
            status: TherapistStatus::Active,
        };
        queries::create_user(&conn, &user).unwrap();

        let token = issue_token(&conn, "u-1").unwrap();
        let found = user_for_token(&conn, &token).unwrap().unwrap();
        assert_eq!(found.id, "u-1");

        assert!(revoke_token(&conn, &token).unwrap());
        assert!(user_for_token(&conn, &token).unwrap().is_none());
        assert!(!revoke_token(&conn, &token).unwrap());
    }
}
