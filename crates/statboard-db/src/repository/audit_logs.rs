//! Audit log operations

use chrono::Utc;
use sqlx::Row;

use crate::error::DbError;
use crate::models::{AuditAction, AuditLogEntry, NewAuditLog};
use crate::repository::Database;

/// Query parameters for listing audit logs
#[derive(Debug, Clone)]
pub struct AuditLogQuery {
    /// Filter by action tag
    pub action: Option<AuditAction>,
    /// Filter by acting user ID
    pub user_id: Option<i64>,
    /// Pagination offset
    pub offset: i64,
    /// Pagination limit
    pub limit: i64,
}

impl Default for AuditLogQuery {
    fn default() -> Self {
        Self {
            action: None,
            user_id: None,
            offset: 0,
            limit: 50,
        }
    }
}

impl Database {
    /// Append an audit log entry
    pub async fn insert_audit_log(&self, log: NewAuditLog) -> Result<AuditLogEntry, DbError> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO audit_logs (user_id, action, details, timestamp)
            VALUES (?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(log.user_id)
        .bind(log.action.as_str())
        .bind(&log.details)
        .bind(now.to_rfc3339())
        .fetch_one(&self.pool)
        .await?;

        let id: i64 = result.get("id");

        Ok(AuditLogEntry {
            id,
            user_id: log.user_id,
            action: log.action,
            details: log.details,
            timestamp: now,
        })
    }

    /// List audit logs with filtering and pagination
    pub async fn list_audit_logs(
        &self,
        query: AuditLogQuery,
    ) -> Result<(Vec<AuditLogEntry>, i64), DbError> {
        let mut conditions = Vec::new();
        let mut params: Vec<String> = Vec::new();

        if let Some(action) = &query.action {
            conditions.push("action = ?");
            params.push(action.as_str().to_string());
        }
        if let Some(user_id) = query.user_id {
            conditions.push("user_id = ?");
            params.push(user_id.to_string());
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let count_sql = format!("SELECT COUNT(*) as count FROM audit_logs {}", where_clause);
        let mut count_query = sqlx::query(&count_sql);
        for param in &params {
            count_query = count_query.bind(param);
        }
        let total: i64 = count_query.fetch_one(&self.pool).await?.get("count");

        let sql = format!(
            r#"
            SELECT id, user_id, action, details, timestamp
            FROM audit_logs
            {}
            ORDER BY id DESC
            LIMIT ? OFFSET ?
            "#,
            where_clause
        );

        let mut logs_query = sqlx::query(&sql);
        for param in &params {
            logs_query = logs_query.bind(param);
        }
        logs_query = logs_query.bind(query.limit).bind(query.offset);

        let rows = logs_query.fetch_all(&self.pool).await?;
        let logs: Result<Vec<AuditLogEntry>, _> = rows
            .iter()
            .map(|row| AuditLogEntry::try_from(row).map_err(DbError::from))
            .collect();

        Ok((logs?, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewUser, Role};

    fn entry(user_id: Option<i64>, action: AuditAction, details: &str) -> NewAuditLog {
        NewAuditLog {
            user_id,
            action,
            details: Some(details.to_string()),
        }
    }

    #[tokio::test]
    async fn test_insert_and_list_newest_first() {
        let db = Database::in_memory().await.unwrap();

        db.insert_audit_log(entry(Some(1), AuditAction::Register, "registered"))
            .await
            .unwrap();
        db.insert_audit_log(entry(Some(1), AuditAction::Login, "logged in"))
            .await
            .unwrap();
        db.insert_audit_log(entry(Some(2), AuditAction::Login, "logged in"))
            .await
            .unwrap();

        let (logs, total) = db.list_audit_logs(AuditLogQuery::default()).await.unwrap();
        assert_eq!(total, 3);
        assert_eq!(logs[0].user_id, Some(2));
        assert_eq!(logs[2].action, AuditAction::Register);

        let (logs, total) = db
            .list_audit_logs(AuditLogQuery {
                action: Some(AuditAction::Login),
                user_id: Some(1),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(logs[0].details.as_deref(), Some("logged in"));
    }

    #[tokio::test]
    async fn test_pagination() {
        let db = Database::in_memory().await.unwrap();
        for i in 0..5 {
            db.insert_audit_log(entry(Some(i), AuditAction::Login, "logged in"))
                .await
                .unwrap();
        }

        let (logs, total) = db
            .list_audit_logs(AuditLogQuery {
                offset: 1,
                limit: 2,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(total, 5);
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].user_id, Some(3));
    }

    #[tokio::test]
    async fn test_entries_survive_user_deletion() {
        let db = Database::in_memory().await.unwrap();
        let user = db
            .insert_user(NewUser {
                name: "Ada".to_string(),
                email: "ada@x.com".to_string(),
                password_hash: "hash".to_string(),
                role: Role::User,
            })
            .await
            .unwrap();
        db.insert_audit_log(entry(Some(user.id), AuditAction::Register, "registered"))
            .await
            .unwrap();

        assert!(db.delete_user(user.id).await.unwrap());

        let (logs, _) = db.list_audit_logs(AuditLogQuery::default()).await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].user_id, Some(user.id));
    }
}
