//! Statboard REST API
//!
//! This crate provides the Axum-based HTTP surface for Statboard:
//! registration, login, session lookup and the admin-only user and
//! audit log management endpoints.

pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::{AppState, MetricsHandle};
