//! Password hashing (bcrypt) and policy.

use rand::Rng;
use rand::distributions::Alphanumeric;
use thiserror::Error;

pub const MIN_PASSWORD_LEN: usize = 8;

/// Length of passwords produced by an administrative reset.
pub const GENERATED_PASSWORD_LEN: usize = 12;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PasswordError {
    #[error("password must be at least {min} characters")]
    TooShort { min: usize },

    #[error("failed to hash password: {0}")]
    Hash(String),
}

pub fn check_password_policy(plain: &str) -> Result<(), PasswordError> {
    if plain.chars().count() < MIN_PASSWORD_LEN {
        return Err(PasswordError::TooShort { min: MIN_PASSWORD_LEN });
    }
    Ok(())
}

pub fn hash_password(plain: &str, cost: u32) -> Result<String, PasswordError> {
    bcrypt::hash(plain, cost).map_err(|e| PasswordError::Hash(e.to_string()))
}

/// Verify `plain` against a stored hash. A hash that cannot be parsed never
/// verifies.
pub fn verify_password(plain: &str, hashed: &str) -> bool {
    match bcrypt::verify(plain, hashed) {
        Ok(ok) => ok,
        Err(e) => {
            tracing::warn!(error = %e, "stored password hash could not be verified");
            false
        }
    }
}

/// Random alphanumeric password of `len` characters.
pub fn generate_password(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}
