//! User operations

use chrono::Utc;
use sqlx::Row;

use crate::error::DbError;
use crate::models::{NewUser, Role, User};
use crate::repository::Database;

impl Database {
    // ==================== User Operations ====================

    /// Insert a new user
    ///
    /// Relies on the UNIQUE constraint on `email`, so two concurrent inserts of
    /// the same address can never both succeed.
    pub async fn insert_user(&self, user: NewUser) -> Result<User, DbError> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO users (name, email, password_hash, role, created_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(now.to_rfc3339())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DbError::from_insert(e, format!("User '{}' already exists", user.email)))?;

        let id: i64 = result.get("id");

        Ok(User {
            id,
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            created_at: now,
        })
    }

    /// Get a user by email
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, DbError> {
        let result = sqlx::query(
            r#"
            SELECT id, name, email, password_hash, role, created_at
            FROM users
            WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        result.map(|row| User::try_from(&row).map_err(DbError::from)).transpose()
    }

    /// Get a user by ID
    pub async fn get_user_by_id(&self, id: i64) -> Result<Option<User>, DbError> {
        let result = sqlx::query(
            r#"
            SELECT id, name, email, password_hash, role, created_at
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        result.map(|row| User::try_from(&row).map_err(DbError::from)).transpose()
    }

    /// List all users
    pub async fn list_users(&self) -> Result<Vec<User>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, email, password_hash, role, created_at
            FROM users
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| User::try_from(row).map_err(DbError::from))
            .collect()
    }

    /// Update user role
    pub async fn update_user_role(&self, id: i64, role: Role) -> Result<bool, DbError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET role = ?
            WHERE id = ?
            "#,
        )
        .bind(role.as_str())
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a user
    pub async fn delete_user(&self, id: i64) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count user records
    pub async fn count_users(&self) -> Result<i64, DbError> {
        let result = sqlx::query("SELECT COUNT(*) as count FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(result.get("count"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Ada".to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            role: Role::User,
        }
    }

    #[tokio::test]
    async fn test_insert_and_fetch() {
        let db = Database::in_memory().await.unwrap();

        let user = db.insert_user(new_user("ada@x.com")).await.unwrap();
        assert_eq!(user.id, 1);

        let fetched = db.get_user_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(fetched.email, "ada@x.com");
        assert_eq!(fetched.role, Role::User);

        let by_email = db.get_user_by_email("ada@x.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, user.id);
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected_by_constraint() {
        let db = Database::in_memory().await.unwrap();

        db.insert_user(new_user("ada@x.com")).await.unwrap();
        let err = db.insert_user(new_user("ada@x.com")).await.unwrap_err();
        assert!(matches!(err, DbError::Duplicate(_)));

        // Email comparison ignores case
        let err = db.insert_user(new_user("ADA@X.com")).await.unwrap_err();
        assert!(matches!(err, DbError::Duplicate(_)));
        assert!(db.get_user_by_email("Ada@x.COM").await.unwrap().is_some());

        assert_eq!(db.count_users().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_role_and_delete() {
        let db = Database::in_memory().await.unwrap();
        let user = db.insert_user(new_user("ada@x.com")).await.unwrap();

        assert!(db.update_user_role(user.id, Role::Analyst).await.unwrap());
        let fetched = db.get_user_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(fetched.role, Role::Analyst);

        assert!(!db.update_user_role(999, Role::Admin).await.unwrap());

        assert!(db.delete_user(user.id).await.unwrap());
        assert!(!db.delete_user(user.id).await.unwrap());
        assert!(db.get_user_by_id(user.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unknown_stored_role_is_an_error() {
        let db = Database::in_memory().await.unwrap();
        let user = db.insert_user(new_user("ada@x.com")).await.unwrap();

        sqlx::query("UPDATE users SET role = 'SuperUser' WHERE id = ?")
            .bind(user.id)
            .execute(db.pool())
            .await
            .unwrap();

        assert!(db.get_user_by_id(user.id).await.is_err());
    }

    #[tokio::test]
    async fn test_list_users_ordered_by_id() {
        let db = Database::in_memory().await.unwrap();
        db.insert_user(new_user("b@x.com")).await.unwrap();
        db.insert_user(new_user("a@x.com")).await.unwrap();

        let users = db.list_users().await.unwrap();
        let emails: Vec<_> = users.iter().map(|u| u.email.as_str()).collect();
        assert_eq!(emails, vec!["b@x.com", "a@x.com"]);
    }
}
