//! Request/Response DTOs

use serde::{Deserialize, Deserializer, Serialize};
use statboard_db::{AuditLogEntry, UserSummary};

/// Treat an explicit `null` like an absent field
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

// ==================== Auth Types ====================

/// Registration request
///
/// Absent or null fields become empty strings and are reported as missing by
/// the service.
#[derive(Deserialize, Default)]
#[serde(default)]
pub struct RegisterRequest {
    #[serde(deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub email: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub password: String,
    pub role: Option<String>,
}

/// Registration response
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub message: String,
    pub user_id: i64,
}

/// Login request
#[derive(Deserialize, Default)]
#[serde(default)]
pub struct LoginRequest {
    #[serde(deserialize_with = "null_as_empty")]
    pub email: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub password: String,
}

/// Login response
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub message: String,
    pub access_token: String,
    pub expires_in: i64,
    pub user: UserSummary,
}

/// Current session response
#[derive(Serialize)]
pub struct SessionResponse {
    pub user: UserSummary,
}

// ==================== User Types ====================

/// Change role request
#[derive(Deserialize, Default)]
#[serde(default)]
pub struct ChangeRoleRequest {
    #[serde(deserialize_with = "null_as_empty")]
    pub role: String,
}

/// Change role response
#[derive(Serialize)]
pub struct ChangeRoleResponse {
    pub message: String,
    pub role: String,
}

/// Plain acknowledgement
#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

// ==================== Audit Log Types ====================

/// Audit log query parameters
#[derive(Deserialize)]
pub struct AuditLogsQuery {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default = "default_offset")]
    pub offset: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_offset() -> i64 {
    0
}

fn default_limit() -> i64 {
    50
}

/// Audit log entry response
#[derive(Serialize)]
pub struct AuditLogResponse {
    pub id: i64,
    pub timestamp: String,
    pub action: String,
    pub user_id: Option<i64>,
    pub details: Option<String>,
}

impl From<AuditLogEntry> for AuditLogResponse {
    fn from(log: AuditLogEntry) -> Self {
        Self {
            id: log.id,
            timestamp: log.timestamp.to_rfc3339(),
            action: log.action.as_str().to_string(),
            user_id: log.user_id,
            details: log.details,
        }
    }
}

/// Paginated audit logs response
#[derive(Serialize)]
pub struct AuditLogsListResponse {
    pub logs: Vec<AuditLogResponse>,
    pub total: i64,
    pub offset: i64,
    pub limit: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_fields_read_as_empty() {
        let request: RegisterRequest =
            serde_json::from_str(r#"{"name": null, "email": "ada@x.com"}"#).unwrap();
        assert_eq!(request.name, "");
        assert_eq!(request.email, "ada@x.com");
        assert_eq!(request.password, "");
        assert!(request.role.is_none());

        let request: ChangeRoleRequest = serde_json::from_str(r#"{"role": null}"#).unwrap();
        assert_eq!(request.role, "");
    }

    #[test]
    fn test_wrong_type_still_rejected() {
        assert!(serde_json::from_str::<LoginRequest>(r#"{"email": 5}"#).is_err());
    }
}
