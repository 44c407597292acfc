//! Password hashing with Argon2id.
//!
//! Hashes are stored as PHC strings (`$argon2id$v=19$...`).

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::error::{ErrorKind, ServerResult};

/// Hashes a password with a random salt.
pub fn hash_password(password: &str) -> ServerResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ErrorKind::PasswordError(format!("Failed to hash password: {}", e)))?;

    Ok(hash.to_string())
}

/// Checks a password against a stored hash.
///
/// A malformed hash is an error. A wrong password is `Ok(false)`.
pub fn verify_password(password: &str, hash: &str) -> ServerResult<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| ErrorKind::PasswordError(format!("Invalid password hash: {}", e)))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
