use argon2::Argon2;
use argon2::password_hash::{PasswordHasher, SaltString, rand_core::OsRng};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("failed to hash password: {0}")]
    HashFailure(String),
}

/// Hashes a plaintext password with Argon2id and a random salt, producing a
/// PHC-format string suitable for storage on the user record.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| PasswordError::HashFailure(err.to_string()))?;

    Ok(password_hash.to_string())
}
