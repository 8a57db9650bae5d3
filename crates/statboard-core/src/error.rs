//! Core error types

use serde::Serialize;
use statboard_auth::AuthError;
use statboard_db::DbError;
use thiserror::Error;

/// Stable, machine-checkable failure category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    MissingField,
    DuplicateIdentity,
    NotFound,
    InvalidCredential,
    Unauthenticated,
    Forbidden,
    InvalidOperation,
    InvalidRole,
    StorageUnavailable,
    Internal,
}

impl ErrorKind {
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::MissingField => "MISSING_FIELD",
            ErrorKind::DuplicateIdentity => "DUPLICATE_IDENTITY",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::InvalidCredential => "INVALID_CREDENTIAL",
            ErrorKind::Unauthenticated => "UNAUTHENTICATED",
            ErrorKind::Forbidden => "FORBIDDEN",
            ErrorKind::InvalidOperation => "INVALID_OPERATION",
            ErrorKind::InvalidRole => "INVALID_ROLE",
            ErrorKind::StorageUnavailable => "STORAGE_UNAVAILABLE",
            ErrorKind::Internal => "INTERNAL_ERROR",
        }
    }
}

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Email already registered: {0}")]
    DuplicateIdentity(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid credentials")]
    InvalidCredential,

    #[error("Unauthenticated: {0}")]
    Unauthenticated(#[source] AuthError),

    #[error("Insufficient permissions")]
    Forbidden,

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Invalid role: {0}")]
    InvalidRole(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(#[source] DbError),

    /// Hashing or signing failed
    #[error("Internal error: {0}")]
    Internal(#[source] AuthError),
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::MissingField(_) => ErrorKind::MissingField,
            ServiceError::DuplicateIdentity(_) => ErrorKind::DuplicateIdentity,
            ServiceError::NotFound(_) => ErrorKind::NotFound,
            ServiceError::InvalidCredential => ErrorKind::InvalidCredential,
            ServiceError::Unauthenticated(_) => ErrorKind::Unauthenticated,
            ServiceError::Forbidden => ErrorKind::Forbidden,
            ServiceError::InvalidOperation(_) => ErrorKind::InvalidOperation,
            ServiceError::InvalidRole(_) => ErrorKind::InvalidRole,
            ServiceError::StorageUnavailable(_) => ErrorKind::StorageUnavailable,
            ServiceError::Internal(_) => ErrorKind::Internal,
        }
    }
}

impl From<DbError> for ServiceError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Duplicate(msg) => ServiceError::DuplicateIdentity(msg),
            other => ServiceError::StorageUnavailable(other),
        }
    }
}
