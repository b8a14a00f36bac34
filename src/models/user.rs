// src/models/user.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'users' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,

    pub username: String,

    /// Argon2 hash, never serialized into responses.
    #[serde(skip)]
    pub password: String,

    /// 'student' (the registration default) or 'instructor'.
    pub role: String,

    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for registration.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 3, max = 50, message = "Username must be 3 to 50 characters."))]
    pub username: String,
    #[validate(length(min = 4, max = 128, message = "Password must be 4 to 128 characters."))]
    pub password: String,
}

/// DTO for login. Lengths are only sanity bounds here; the real check is
/// the hash comparison.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 50))]
    pub username: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}
