//! Statboard - account and session service for the analytics dashboard

use anyhow::{Context, Result};
use chrono::Duration;
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod config;

use config::{Config, JWT_SECRET_ENV};
use statboard_api::{AppState, create_router};
use statboard_auth::{JwtManager, TokenConfig};
use statboard_core::{AuditRecorder, AuthService};
use statboard_db::Database;

/// Statboard - account and session service
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    /// Bind address
    #[arg(long, env = "STATBOARD_BIND")]
    bind: Option<String>,

    /// Port
    #[arg(short, long, env = "STATBOARD_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::load(&args.config)?;

    init_logging(&config.logging.level, &config.logging.format);

    info!("Starting Statboard v{}", env!("CARGO_PKG_VERSION"));
    if Path::new(&args.config).exists() {
        info!("Loaded configuration from {}", args.config);
    } else {
        info!("Config file not found at {}, using defaults", args.config);
    }
    if config.weak_secret() {
        warn!(
            "JWT secret is weak; set auth.jwt_secret or {} before deploying",
            JWT_SECRET_ENV
        );
    }

    // Initialize database
    if let Some(parent) = Path::new(&config.database.path).parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let db_url = format!("sqlite:{}?mode=rwc", config.database.path);
    let db = Arc::new(Database::new(&db_url).await?);

    // Initialize JWT manager
    let token_config = TokenConfig::new(config.auth.jwt_secret.clone())
        .with_algorithm(&config.auth.algorithm)
        .context("Invalid auth.algorithm")?
        .with_validity(Duration::hours(config.auth.token_validity_hours));
    let jwt = Arc::new(JwtManager::new(token_config));

    let audit = AuditRecorder::new(db.clone());
    let service = Arc::new(AuthService::new(
        db,
        jwt.clone(),
        audit.clone(),
        config.auth.login_failure_policy,
    ));

    // Create the configured admin if no users exist
    if let Some(admin) = &config.auth.bootstrap_admin {
        match service
            .bootstrap_admin(&admin.name, &admin.email, &admin.password)
            .await?
        {
            Some(id) => info!("Bootstrap admin created (id: {}, email: {})", id, admin.email),
            None => info!("Users already exist, skipping bootstrap admin"),
        }
    }

    let metrics_handle = if config.metrics.enabled {
        match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => Some(Arc::new(handle)),
            Err(e) => {
                warn!("Failed to install metrics recorder: {}", e);
                None
            }
        }
    } else {
        None
    };

    let state = AppState::new(service, jwt);
    let app = create_router(state, metrics_handle);

    // Determine bind address
    let bind_addr = args.bind.unwrap_or(config.server.bind_address);
    let port = args.port.unwrap_or(config.server.port);
    let addr: SocketAddr = format!("{}:{}", bind_addr, port).parse()?;

    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Waiting for {} pending audit writes", audit.in_flight());
    audit.shutdown().await;

    info!("Server stopped");
    Ok(())
}

/// Initialize logging
fn init_logging(level: &str, format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = tracing_subscriber::registry().with(filter);

    if format == "json" {
        subscriber.with(fmt::layer().json()).init();
    } else {
        subscriber.with(fmt::layer()).init();
    }
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
