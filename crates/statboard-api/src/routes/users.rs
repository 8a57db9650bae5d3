//! User management routes (Admin only)

use axum::{
    Json, Router,
    extract::State,
    routing::{get, put},
};
use statboard_auth::AuthUser;
use statboard_db::UserSummary;

use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath};
use crate::state::AppState;

use super::types::{ChangeRoleRequest, ChangeRoleResponse, MessageResponse};

/// GET /api/users
async fn list_users(
    caller: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<UserSummary>>, ApiError> {
    let users = state.auth.list_users(&caller).await?;
    Ok(Json(users))
}

/// GET /api/users/{id}
async fn get_user(
    caller: AuthUser,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<UserSummary>, ApiError> {
    let user = state.auth.get_user(&caller, id).await?;
    Ok(Json(user))
}

/// DELETE /api/users/{id}
async fn delete_user(
    caller: AuthUser,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.auth.delete_user(&caller, id).await?;
    Ok(Json(MessageResponse {
        message: "User deleted successfully".to_string(),
    }))
}

/// PUT /api/users/{id}/role
async fn change_role(
    caller: AuthUser,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(request): ApiJson<ChangeRoleRequest>,
) -> Result<Json<ChangeRoleResponse>, ApiError> {
    let role = state.auth.change_role(&caller, id, &request.role).await?;
    Ok(Json(ChangeRoleResponse {
        message: "Role updated successfully".to_string(),
        role: role.as_str().to_string(),
    }))
}

/// Create user routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/users", get(list_users))
        .route("/api/users/{id}", get(get_user).delete(delete_user))
        .route("/api/users/{id}/role", put(change_role))
}
