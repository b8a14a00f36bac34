// src/utils/jwt.rs

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode, header},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind};
use serde::{Deserialize, Serialize};

use crate::{config::Config, error::AppError};

/// Claims carried by every issued token.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Claims {
    /// User id, stringified per the JWT `sub` convention.
    pub sub: String,
    /// 'student' or 'instructor'.
    pub role: String,
    /// Expiration as a Unix timestamp.
    pub exp: usize,
}

/// Issues a token for the user, valid for `expiration_seconds` from now.
pub fn sign_jwt(
    id: i64,
    role: &str,
    secret: &str,
    expiration_seconds: u64,
) -> Result<String, AppError> {
    let claims = Claims {
        sub: id.to_string(),
        role: role.to_owned(),
        exp: (jsonwebtoken::get_current_timestamp() + expiration_seconds) as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(format!("Failed to sign token: {}", e)))
}

/// Decodes and checks a token, expiry included.
pub fn verify_jwt(token: &str, secret: &str) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AppError::AuthError("Token expired".to_string()),
        _ => AppError::AuthError("Invalid token".to_string()),
    })
}

/// Authentication middleware: requires a valid 'Authorization: Bearer'
/// header and injects the decoded `Claims` into the request extensions.
/// Anything else is a 401.
pub async fn auth_middleware(
    State(config): State<Config>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let claims = verify_jwt(token, &config.jwt_secret).map_err(|_| StatusCode::UNAUTHORIZED)?;
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

/// Role gate for instructor-only routes. Runs after `auth_middleware`; a
/// request without claims is a 401, a non-instructor a 403.
pub async fn instructor_middleware(req: Request<Body>, next: Next) -> Result<Response, StatusCode> {
    let role = req
        .extensions()
        .get::<Claims>()
        .map(|claims| claims.role.clone())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    if role != "instructor" {
        return Err(StatusCode::FORBIDDEN);
    }

    Ok(next.run(req).await)
}
