//! API error types

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use statboard_auth::AuthError;
use statboard_core::{ErrorKind, ServiceError};
use thiserror::Error;
use tracing::error;

/// HTTP-layer failures carry their own codes; everything from the service
/// uses its `ErrorKind` code.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Well-formed request rejected by an input limit
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Json(#[from] JsonRejection),

    #[error(transparent)]
    Path(#[from] PathRejection),

    #[error(transparent)]
    Query(#[from] QueryRejection),

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::MissingField | ErrorKind::InvalidRole | ErrorKind::InvalidOperation => {
            StatusCode::BAD_REQUEST
        }
        ErrorKind::DuplicateIdentity => StatusCode::CONFLICT,
        ErrorKind::InvalidCredential | ErrorKind::Unauthenticated => StatusCode::UNAUTHORIZED,
        ErrorKind::Forbidden => StatusCode::FORBIDDEN,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::StorageUnavailable | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Json(rejection) => {
                (rejection.status(), "MALFORMED_REQUEST", rejection.body_text())
            }
            ApiError::Path(rejection) => {
                (rejection.status(), "MALFORMED_REQUEST", rejection.body_text())
            }
            ApiError::Query(rejection) => {
                (rejection.status(), "MALFORMED_REQUEST", rejection.body_text())
            }
            ApiError::Auth(e) => return e.into_response(),
            ApiError::Service(e) => {
                let kind = e.kind();
                let status = status_for(kind);
                // Don't leak storage or crypto internals to clients
                let message = if status.is_server_error() {
                    error!("Request failed: {}", e);
                    "Internal server error".to_string()
                } else {
                    e.to_string()
                };
                (status, kind.code(), message)
            }
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
