// src/utils/jwt.rs

use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode, header},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{config::Config, error::AppError};

/// JWT Claims structure.
///
/// Tokens are issued by the portal's identity service; this crate only
/// verifies and consumes them. The claims carry everything the quiz
/// subsystem needs to know about the viewer: who they are, their role,
/// and the profile scope used to filter the student catalog.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Claims {
    /// Subject - Stores the User ID (as string).
    pub sub: String,
    /// Display name, denormalized into attempts at submission time.
    pub name: String,
    /// Viewer role: 'teacher' or 'student'.
    pub role: String,
    /// Profile scope (students only; empty strings for teachers).
    #[serde(default)]
    pub branch: String,
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub semester: String,
    /// Expiration time as Unix timestamp.
    pub exp: usize,
}

impl Claims {
    /// Parses the subject claim into a numeric user id.
    /// A token without a usable id cannot attribute an attempt.
    pub fn user_id(&self) -> Result<i64, AppError> {
        self.sub
            .parse::<i64>()
            .map_err(|_| AppError::AuthError("Missing student identity".to_string()))
    }
}

/// Signs a JWT for the given identity.
///
/// The service never issues tokens in production (the identity service
/// does); this exists so integration tests can mint viewers.
pub fn sign_jwt(
    id: i64,
    name: &str,
    role: &str,
    scope: (&str, &str, &str),
    secret: &str,
    expiration_seconds: u64,
) -> Result<String, AppError> {
    // Calculate expiration: current time + expiration_seconds
    let expiration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .as_secs() as usize
        + expiration_seconds as usize;

    let (branch, year, semester) = scope;
    let claims = Claims {
        sub: id.to_string(),
        name: name.to_owned(),
        role: role.to_owned(),
        branch: branch.to_owned(),
        year: year.to_owned(),
        semester: semester.to_owned(),
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(e.to_string()))
}

/// Verifies and decodes a JWT string.
///
/// Returns the `Claims` if valid, otherwise returns an `AppError`.
pub fn verify_jwt(token: &str, secret: &str) -> Result<Claims, AppError> {
    let token_data = decode(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::AuthError("Invalid token".to_string()))?;

    Ok(token_data.claims)
}

/// Axum Middleware: Authentication.
///
/// Intercepts requests, validates the 'Authorization: Bearer <token>' header.
/// If valid, injects `Claims` into the request extensions for handlers to use.
/// If invalid, returns 401 Unauthorized.
pub async fn auth_middleware(
    State(config): State<Config>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let token = match auth_header {
        Some(header) if header.starts_with("Bearer ") => &header[7..],
        _ => return Err(StatusCode::UNAUTHORIZED),
    };

    match verify_jwt(token, &config.jwt_secret) {
        Ok(claims) => {
            req.extensions_mut().insert(claims);
            Ok(next.run(req).await)
        }
        Err(_) => Err(StatusCode::UNAUTHORIZED),
    }
}

/// Checks the viewer's role for routes that are not open to everyone.
/// Returns 403 Forbidden when it does not match.
pub fn require_role(claims: &Claims, role: &str) -> Result<(), AppError> {
    if claims.role != role {
        return Err(AppError::Forbidden(format!(
            "This endpoint requires the '{}' role",
            role
        )));
    }
    Ok(())
}
