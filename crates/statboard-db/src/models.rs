//! Database models

use crate::utils::parse_datetime_or_now;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::Row;
use std::fmt;
use std::str::FromStr;

/// Error type for parsing models from strings
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    InvalidRole(String),
    InvalidAuditAction(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::InvalidRole(s) => write!(f, "Invalid role: {}", s),
            ParseError::InvalidAuditAction(s) => write!(f, "Invalid audit action: {}", s),
        }
    }
}

impl std::error::Error for ParseError {}

/// User role
///
/// Closed set governing every authorization decision. Names are matched
/// exactly; `"admin"` is not `Admin`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum Role {
    #[default]
    User,
    Analyst,
    Manager,
    Admin,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::User, Role::Analyst, Role::Manager, Role::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Analyst => "Analyst",
            Role::Manager => "Manager",
            Role::Admin => "Admin",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "User" => Ok(Role::User),
            "Analyst" => Ok(Role::Analyst),
            "Manager" => Ok(Role::Manager),
            "Admin" => Ok(Role::Admin),
            _ => Err(ParseError::InvalidRole(s.to_string())),
        }
    }
}

/// User model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// View of this record without the password hash
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
        }
    }
}

/// Redacted user view, safe to hand to clients
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserSummary {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
        }
    }
}

/// New user (for insertion)
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

/// Security-relevant event recorded in the audit trail
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    Register,
    Login,
    UserDeleted,
    RoleChanged,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Register => "REGISTER",
            AuditAction::Login => "LOGIN",
            AuditAction::UserDeleted => "USER_DELETED",
            AuditAction::RoleChanged => "ROLE_CHANGED",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuditAction {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "REGISTER" => Ok(AuditAction::Register),
            "LOGIN" => Ok(AuditAction::Login),
            "USER_DELETED" => Ok(AuditAction::UserDeleted),
            "ROLE_CHANGED" => Ok(AuditAction::RoleChanged),
            _ => Err(ParseError::InvalidAuditAction(s.to_string())),
        }
    }
}

/// Audit log entry
///
/// `user_id` is a weak reference: the user may since have been deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub id: i64,
    pub user_id: Option<i64>,
    pub action: AuditAction,
    pub details: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// New audit log entry (for insertion)
#[derive(Debug, Clone)]
pub struct NewAuditLog {
    pub user_id: Option<i64>,
    pub action: AuditAction,
    pub details: Option<String>,
}

// ==================== TryFrom Implementations ====================

impl TryFrom<&sqlx::sqlite::SqliteRow> for User {
    type Error = sqlx::Error;

    fn try_from(row: &sqlx::sqlite::SqliteRow) -> Result<Self, Self::Error> {
        let role_str: String = row.try_get("role")?;
        Ok(User {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            role: Role::from_str(&role_str).map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
            created_at: parse_datetime_or_now(&row.try_get::<String, _>("created_at")?),
        })
    }
}

impl TryFrom<&sqlx::sqlite::SqliteRow> for AuditLogEntry {
    type Error = sqlx::Error;

    fn try_from(row: &sqlx::sqlite::SqliteRow) -> Result<Self, Self::Error> {
        let action_str: String = row.try_get("action")?;
        Ok(AuditLogEntry {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            action: AuditAction::from_str(&action_str)
                .map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
            details: row.try_get("details")?,
            timestamp: parse_datetime_or_now(&row.try_get::<String, _>("timestamp")?),
        })
    }
}
