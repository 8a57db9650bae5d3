//! Statboard Authentication and Authorization
//!
//! This crate provides password hashing, JWT session tokens and the
//! request gate that turns a bearer token into an [`AuthUser`].

pub mod error;
pub mod jwt;
pub mod middleware;
pub mod password;

pub use error::AuthError;
pub use jwt::{Claims, JwtManager, TokenConfig};
pub use middleware::{AuthUser, auth_gate};
pub use password::{
    DUMMY_HASH, hash_password, hash_password_async, verify_password, verify_password_async,
};
