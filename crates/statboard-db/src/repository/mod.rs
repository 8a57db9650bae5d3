//! Database repository implementation

use async_trait::async_trait;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use tracing::info;

use crate::error::DbError;
use crate::models::{AuditLogEntry, NewAuditLog, NewUser, Role, User};
use crate::store::CredentialStore;

// Submodules
mod audit_logs;
mod users;

pub use audit_logs::AuditLogQuery;

/// Database connection and operations
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Create a new database connection
    pub async fn new(database_url: &str) -> Result<Self, DbError> {
        info!("Connecting to database: {}", database_url);

        let pool = SqlitePool::connect(database_url).await?;
        let db = Self { pool };
        db.run_migrations().await?;
        Ok(db)
    }

    /// Open a private in-memory database
    ///
    /// Each SQLite connection to `:memory:` sees its own database, so the pool
    /// is pinned to a single connection that is never recycled.
    pub async fn in_memory() -> Result<Self, DbError> {
        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        let db = Self { pool };
        db.run_migrations().await?;
        Ok(db)
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Run database migrations
    async fn run_migrations(&self) -> Result<(), DbError> {
        info!("Running database migrations");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE COLLATE NOCASE,
                password_hash TEXT NOT NULL,
                role TEXT NOT NULL DEFAULT 'User',
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(migration_error)?;

        // No foreign key on user_id: entries must outlive the users they mention
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS audit_logs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER,
                action TEXT NOT NULL,
                details TEXT,
                timestamp TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(migration_error)?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_audit_logs_timestamp ON audit_logs(timestamp)
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(migration_error)?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_audit_logs_user ON audit_logs(user_id)
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(migration_error)?;

        info!("Database migrations completed");
        Ok(())
    }
}

fn migration_error(err: sqlx::Error) -> DbError {
    DbError::Migration(err.to_string())
}

#[async_trait]
impl CredentialStore for Database {
    async fn create_user(&self, user: NewUser) -> Result<User, DbError> {
        self.insert_user(user).await
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DbError> {
        self.get_user_by_email(email).await
    }

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, DbError> {
        self.get_user_by_id(id).await
    }

    async fn list_users(&self) -> Result<Vec<User>, DbError> {
        Database::list_users(self).await
    }

    async fn update_user_role(&self, id: i64, role: Role) -> Result<bool, DbError> {
        Database::update_user_role(self, id, role).await
    }

    async fn delete_user(&self, id: i64) -> Result<bool, DbError> {
        Database::delete_user(self, id).await
    }

    async fn count_users(&self) -> Result<i64, DbError> {
        Database::count_users(self).await
    }

    async fn append_audit_log(&self, log: NewAuditLog) -> Result<AuditLogEntry, DbError> {
        self.insert_audit_log(log).await
    }

    async fn list_audit_logs(
        &self,
        query: AuditLogQuery,
    ) -> Result<(Vec<AuditLogEntry>, i64), DbError> {
        Database::list_audit_logs(self, query).await
    }
}
