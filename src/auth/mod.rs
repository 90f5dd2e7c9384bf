pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::PublicUser;

// Re-export necessary items
pub use extractors::AuthenticatedUser;
pub use middleware::{AdminMiddleware, AuthMiddleware};
pub use password::{hash_password, verify_password, MIN_BCRYPT_COST};
pub use token::{Claims, TokenError, TokenService};

/// Represents the payload for a new user registration request.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "username can not be empty"))]
    #[serde(default)]
    pub username: String,
    /// Must be at least 8 characters long.
    #[validate(length(min = 8, message = "password must be 8+ characters"))]
    #[serde(default)]
    pub password: String,
}

/// Transient login credentials; never persisted.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "username is required"))]
    #[serde(default)]
    pub username: String,
    #[validate(length(min = 1, message = "password is required"))]
    #[serde(default)]
    pub password: String,
}

/// Response structure after a successful login.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    /// The JWT for subsequent `Authorization: Bearer` headers.
    pub token: String,
    pub user: PublicUser,
}
