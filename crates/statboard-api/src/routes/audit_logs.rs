//! Audit log routes (Admin only)

use axum::{
    Json, Router,
    extract::State,
    routing::get,
};
use statboard_auth::AuthUser;
use statboard_db::{AuditAction, AuditLogQuery};
use std::str::FromStr;

use crate::error::ApiError;
use crate::extract::ApiQuery;
use crate::state::AppState;

use super::types::{AuditLogResponse, AuditLogsListResponse, AuditLogsQuery};

/// Largest page a client may request
const MAX_PAGE_SIZE: i64 = 100;

/// GET /api/audit-logs
async fn list_audit_logs(
    caller: AuthUser,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<AuditLogsQuery>,
) -> Result<Json<AuditLogsListResponse>, ApiError> {
    let action = query
        .action
        .as_deref()
        .map(AuditAction::from_str)
        .transpose()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let offset = query.offset.max(0);
    let limit = query.limit.clamp(1, MAX_PAGE_SIZE);

    let (logs, total) = state
        .auth
        .list_audit_logs(
            &caller,
            AuditLogQuery {
                action,
                user_id: query.user_id,
                offset,
                limit,
            },
        )
        .await?;

    Ok(Json(AuditLogsListResponse {
        logs: logs.into_iter().map(AuditLogResponse::from).collect(),
        total,
        offset,
        limit,
    }))
}

/// Create audit log routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/api/audit-logs", get(list_audit_logs))
}
