//! Authentication error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Missing authorization header")]
    MissingCredential,

    #[error("Invalid authorization header format")]
    InvalidAuthHeader,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Unsupported signing algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

impl AuthError {
    /// A credential was presented but could not be accepted
    pub fn is_rejected_credential(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidAuthHeader | AuthError::InvalidToken | AuthError::TokenExpired
        )
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AuthError::MissingCredential => (
                StatusCode::UNAUTHORIZED,
                "MISSING_CREDENTIAL",
                "Missing authorization header",
            ),
            AuthError::InvalidAuthHeader => (
                StatusCode::UNAUTHORIZED,
                "CREDENTIAL_REJECTED",
                "Invalid authorization header format",
            ),
            AuthError::InvalidToken => {
                (StatusCode::UNAUTHORIZED, "CREDENTIAL_REJECTED", "Invalid token")
            }
            AuthError::TokenExpired => {
                (StatusCode::UNAUTHORIZED, "CREDENTIAL_REJECTED", "Token expired")
            }
            AuthError::UnsupportedAlgorithm(_)
            | AuthError::PasswordHash(_)
            | AuthError::Jwt(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "Internal error",
            ),
        };

        let body = axum::Json(json!({
            "error": {
                "code": code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}
