//! API routes

mod audit_logs;
mod auth;
mod health;
pub mod metrics;
pub mod types;
mod users;

use axum::{Router, extract::DefaultBodyLimit, middleware};
use statboard_auth::auth_gate;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::state::{AppState, MetricsHandle};

/// Request bodies are small JSON documents
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Create the main router
pub fn create_router(state: AppState, metrics_handle: Option<Arc<MetricsHandle>>) -> Router {
    // Every route merged here sits behind the authorization gate
    let protected = Router::new()
        .merge(auth::protected_routes())
        .merge(users::routes())
        .merge(audit_logs::routes())
        .route_layer(middleware::from_fn_with_state(state.jwt.clone(), auth_gate));

    let mut router = Router::new()
        .merge(health::routes())
        .merge(auth::public_routes())
        .merge(protected)
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES));

    if let Some(handle) = metrics_handle {
        router = router.merge(metrics::routes(handle));
    }

    router.layer(TraceLayer::new_for_http())
}
