//! Application state

use metrics_exporter_prometheus::PrometheusHandle;
use statboard_auth::JwtManager;
use statboard_core::AuthService;
use std::sync::Arc;

/// Handle used to render the Prometheus exposition
pub type MetricsHandle = PrometheusHandle;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub jwt: Arc<JwtManager>,
}

impl AppState {
    pub fn new(auth: Arc<AuthService>, jwt: Arc<JwtManager>) -> Self {
        Self { auth, jwt }
    }
}
