use crate::error::AppError;
use bcrypt::{hash, verify};

/// Derives a salted bcrypt verifier from `password`.
///
/// The salt is embedded in the returned string, so `verify_password` needs nothing else.
pub fn hash_password(password: &str, cost: u32) -> Result<String, AppError> {
    Ok(hash(password, cost)?)
}

/// Checks `password` against a stored verifier.
///
/// A mismatch is `Ok(false)`; only a malformed verifier or an engine fault is an error.
pub fn verify_password(password: &str, hashed_password: &str) -> Result<bool, AppError> {
    Ok(verify(password, hashed_password)?)
}
