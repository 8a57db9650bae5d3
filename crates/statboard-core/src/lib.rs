//! Statboard Core Business Logic
//!
//! This crate provides the authentication service: registration, login,
//! session verification and the admin-only account operations, together
//! with best-effort audit recording.

pub mod audit;
pub mod error;
pub mod service;

pub use audit::{AuditErrorHook, AuditFailure, AuditRecorder};
pub use error::{ErrorKind, ServiceError};
pub use service::{AuthService, LoginFailurePolicy, LoginOutcome, Registration};
