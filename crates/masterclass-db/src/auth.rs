//! # Login Checks
//!
//! Password hashing and verification for back-office users.
//!
//! ```text
//! check_login(email, password)
//!      │
//!      ├── no user with that email ──────────► { valid_login: false }
//!      ├── stored hash unparsable / mismatch ─► { valid_login: false }
//!      └── argon2 verify ok ─────────────────► { valid_login: true, is_admin }
//! ```
//!
//! A failed login is an ordinary outcome, not an error. Only database
//! failures surface as `Err`.

use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::Utc;
use serde::Serialize;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::pool::Database;
use masterclass_core::{generate_id, User};

/// Result of a login attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginOutcome {
    pub valid_login: bool,
    pub is_admin: bool,
}

impl LoginOutcome {
    fn rejected() -> Self {
        LoginOutcome {
            valid_login: false,
            is_admin: false,
        }
    }
}

/// Hashes a password into a PHC string with a fresh random salt.
pub fn hash_password(password: &str) -> DbResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| DbError::PasswordHash(e.to_string()))?;

    Ok(hash.to_string())
}

/// Verifies a password against a stored PHC string.
///
/// An unparsable hash counts as a mismatch.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Builds a user record with a hashed password.
pub fn new_user(email: &str, password: &str, is_admin: bool) -> DbResult<User> {
    Ok(User {
        id: generate_id(),
        email: email.trim().to_string(),
        password_hash: hash_password(password)?,
        is_admin,
        created_at: Utc::now(),
    })
}

/// Checks an email/password pair against the users table.
pub async fn check_login(db: &Database, email: &str, password: &str) -> DbResult<LoginOutcome> {
    let Some(user) = db.users().find_by_email(email).await? else {
        debug!(email = %email.trim(), "Login for unknown email");
        return Ok(LoginOutcome::rejected());
    };

    if !verify_password(password, &user.password_hash) {
        debug!(email = %user.email, "Login with wrong password");
        return Ok(LoginOutcome::rejected());
    }

    Ok(LoginOutcome {
        valid_login: true,
        is_admin: user.is_admin,
    })
}
