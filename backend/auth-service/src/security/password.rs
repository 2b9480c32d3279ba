/// Password hashing and verification using Argon2id
use argon2::{
    password_hash::{PasswordHasher, SaltString},
    Argon2, PasswordHash, PasswordVerifier,
};

use crate::error::{AuthError, AuthResult};

pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Hash a password using Argon2id
/// Returns a self-describing PHC string suitable for storage.
/// Strength is the caller's concern, see [`validate_password_strength`].
pub fn hash_password(password: &str) -> AuthResult<String> {
    let salt = SaltString::generate(rand::thread_rng());
    let argon2 = Argon2::default();

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|_| AuthError::Internal("Failed to hash password".to_string()))?
        .to_string();

    Ok(password_hash)
}

/// Constant-time check of a candidate against a stored digest.
/// A malformed digest never matches.
pub fn verify_password(candidate: &str, digest: &str) -> bool {
    let parsed_hash = match PasswordHash::new(digest) {
        Ok(hash) => hash,
        Err(_) => {
            tracing::warn!("stored password digest is not a valid PHC string");
            return false;
        }
    };

    Argon2::default()
        .verify_password(candidate.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Minimum length, counted in characters
pub fn validate_password_strength(password: &str) -> AuthResult<()> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::BadRequest(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}
