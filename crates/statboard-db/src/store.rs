//! Credential store trait

use async_trait::async_trait;

use crate::error::DbError;
use crate::models::{AuditLogEntry, NewAuditLog, NewUser, Role, User};
use crate::repository::AuditLogQuery;

/// Credential store trait
///
/// Persists user records and the append-only audit trail. Every mutation is
/// atomic per record, and email uniqueness is enforced by the store itself:
/// `create_user` fails with [`DbError::Duplicate`] rather than relying on
/// callers to look before they leap.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Insert a new user, failing with `Duplicate` if the email is taken
    async fn create_user(&self, user: NewUser) -> Result<User, DbError>;

    /// Look up a user by login email (case-insensitive)
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DbError>;

    /// Look up a user by ID
    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, DbError>;

    /// List all users ordered by ID
    async fn list_users(&self) -> Result<Vec<User>, DbError>;

    /// Set a user's role, returns false if no such user
    async fn update_user_role(&self, id: i64, role: Role) -> Result<bool, DbError>;

    /// Delete a user, returns false if no such user
    async fn delete_user(&self, id: i64) -> Result<bool, DbError>;

    /// Number of user records
    async fn count_users(&self) -> Result<i64, DbError>;

    /// Append an audit entry
    async fn append_audit_log(&self, log: NewAuditLog) -> Result<AuditLogEntry, DbError>;

    /// List audit entries (newest first) with the total matching count
    async fn list_audit_logs(
        &self,
        query: AuditLogQuery,
    ) -> Result<(Vec<AuditLogEntry>, i64), DbError>;
}
