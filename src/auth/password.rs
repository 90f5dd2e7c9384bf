use crate::error::AppError;
use bcrypt::{hash, verify};

/// Lowest work factor bcrypt accepts.
pub const MIN_BCRYPT_COST: u32 = 4;

/// Salted one-way hash. Minimum length rules are enforced by callers
/// (see `RegisterRequest`), not here.
pub fn hash_password(password: &str, cost: u32) -> Result<String, AppError> {
    hash(password, cost)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

/// Returns `Ok(false)` on mismatch; an error only when the stored hash is malformed.
pub fn verify_password(password: &str, hashed_password: &str) -> Result<bool, AppError> {
    verify(password, hashed_password)
        .map_err(|e| AppError::Internal(format!("Failed to verify password: {}", e)))
}
