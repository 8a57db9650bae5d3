//! Statboard Credential Store
//!
//! This crate provides the persistence layer for Statboard accounts and the
//! security audit trail, using SQLite via sqlx.

pub mod error;
pub mod models;
pub mod repository;
pub mod store;
pub mod utils;

pub use error::DbError;
pub use models::*;
pub use repository::{AuditLogQuery, Database};
pub use store::CredentialStore;
