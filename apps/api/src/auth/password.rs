//! Password hashing via Argon2id.
//!
//! Plaintext passwords exist only in request scope; only the PHC-format hash
//! is persisted. Verification goes through `argon2`'s `verify_password`,
//! which compares in constant time.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use anyhow::anyhow;

use crate::errors::AppError;

/// Hashes a plaintext password with a fresh random salt.
pub fn hash_password(plaintext: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow!("password hashing failed: {e}")))?;
    Ok(hash.to_string())
}

/// Checks a plaintext password against a stored PHC-format hash.
pub fn verify_password(plaintext: &str, stored_hash: &str) -> Result<bool, AppError> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| AppError::Internal(anyhow!("stored password hash is malformed: {e}")))?;
    Ok(Argon2::default()
        .verify_password(plaintext.as_bytes(), &parsed)
        .is_ok())
}
