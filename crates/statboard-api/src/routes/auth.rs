//! Registration, login and session routes

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
};
use statboard_auth::middleware::bearer_token;
use statboard_core::Registration;
use tracing::debug;

use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::state::AppState;

use super::types::{
    LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, SessionResponse,
};

// ==================== Input Validation ====================

/// Maximum allowed email length (RFC 5321 path limit)
pub(crate) const MAX_EMAIL_LENGTH: usize = 254;
/// Maximum allowed display name length
pub(crate) const MAX_NAME_LENGTH: usize = 128;
/// Maximum allowed password length (prevent DoS with very large passwords)
pub(crate) const MAX_PASSWORD_LENGTH: usize = 256;

/// Reject oversized input before it reaches the hasher or the store
fn validate_length(field: &str, value: &str, max: usize) -> Result<(), ApiError> {
    if value.chars().count() > max {
        return Err(ApiError::BadRequest(format!(
            "{} exceeds maximum length of {} characters",
            field, max
        )));
    }
    Ok(())
}

// ==================== Auth Routes ====================

/// POST /api/auth/register
async fn register(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    validate_length("Name", &request.name, MAX_NAME_LENGTH)?;
    validate_length("Email", &request.email, MAX_EMAIL_LENGTH)?;
    validate_length("Password", &request.password, MAX_PASSWORD_LENGTH)?;

    let user_id = state
        .auth
        .register(Registration {
            name: request.name,
            email: request.email,
            password: request.password,
            role: request.role,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully".to_string(),
            user_id,
        }),
    ))
}

/// POST /api/auth/login
async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    validate_length("Email", &request.email, MAX_EMAIL_LENGTH)?;
    validate_length("Password", &request.password, MAX_PASSWORD_LENGTH)?;

    let outcome = state.auth.login(&request.email, &request.password).await?;

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        access_token: outcome.token,
        expires_in: outcome.expires_in,
        user: outcome.user,
    }))
}

/// GET /api/auth/me
///
/// Re-reads the account so the response reflects role changes made since
/// the token was issued.
async fn me(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<SessionResponse>, ApiError> {
    let token = bearer_token(&headers)?;
    let user = state.auth.verify_session(token).await?;

    debug!("Session resolved for user {}", user.id);
    Ok(Json(SessionResponse { user }))
}

/// Routes reachable without a token
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
}

/// Routes behind the authorization gate
pub fn protected_routes() -> Router<AppState> {
    Router::new().route("/api/auth/me", get(me))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_length_counts_chars() {
        assert!(validate_length("Name", "Ada", MAX_NAME_LENGTH).is_ok());
        assert!(validate_length("Name", &"é".repeat(128), MAX_NAME_LENGTH).is_ok());
        assert!(matches!(
            validate_length("Name", &"a".repeat(129), MAX_NAME_LENGTH),
            Err(ApiError::BadRequest(msg)) if msg.contains("128")
        ));
    }
}
