//! Configuration loading

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use statboard_core::LoginFailurePolicy;
use std::path::Path;

/// Environment variable overriding `auth.jwt_secret`
pub const JWT_SECRET_ENV: &str = "STATBOARD_JWT_SECRET";

/// One year
pub const MAX_TOKEN_VALIDITY_HOURS: i64 = 24 * 365;

const MIN_SECRET_LENGTH: usize = 32;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Account created at startup when the store is empty
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapAdminConfig {
    #[serde(default = "default_admin_name")]
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    #[serde(default = "default_algorithm")]
    pub algorithm: String,
    #[serde(default = "default_token_validity_hours")]
    pub token_validity_hours: i64,
    #[serde(default)]
    pub login_failure_policy: LoginFailurePolicy,
    #[serde(default)]
    pub bootstrap_admin: Option<BootstrapAdminConfig>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            algorithm: default_algorithm(),
            token_validity_hours: default_token_validity_hours(),
            login_failure_policy: LoginFailurePolicy::default(),
            bootstrap_admin: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// `pretty` or `json`
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Prometheus exporter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_enabled")]
    pub enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_metrics_enabled(),
        }
    }
}

// Default value functions
fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_db_path() -> String {
    "./data/statboard.db".to_string()
}

fn default_admin_name() -> String {
    "Administrator".to_string()
}

fn default_jwt_secret() -> String {
    "change-me-in-production".to_string()
}

fn default_algorithm() -> String {
    "HS256".to_string()
}

fn default_token_validity_hours() -> i64 {
    24
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_metrics_enabled() -> bool {
    true
}

impl Config {
    /// Load configuration from a TOML file, falling back to defaults when absent
    pub fn load(path: &str) -> Result<Self> {
        let config_path = Path::new(path);

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(config_path)
                .with_context(|| format!("Failed to read config file: {}", path))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path))?
        } else {
            Self::default()
        };

        config.apply_env(std::env::var(JWT_SECRET_ENV).ok());
        config.validate()?;
        Ok(config)
    }

    fn apply_env(&mut self, jwt_secret: Option<String>) {
        if let Some(secret) = jwt_secret.filter(|s| !s.is_empty()) {
            self.auth.jwt_secret = secret;
        }
    }

    fn validate(&self) -> Result<()> {
        if self.auth.jwt_secret.is_empty() {
            anyhow::bail!("auth.jwt_secret must not be empty");
        }
        if self.auth.token_validity_hours <= 0
            || self.auth.token_validity_hours > MAX_TOKEN_VALIDITY_HOURS
        {
            anyhow::bail!(
                "auth.token_validity_hours must be between 1 and {}, got {}",
                MAX_TOKEN_VALIDITY_HOURS,
                self.auth.token_validity_hours
            );
        }
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            anyhow::bail!(
                "logging.format must be \"pretty\" or \"json\", got {:?}",
                self.logging.format
            );
        }
        Ok(())
    }

    /// The signing secret is the shipped default or too short to trust
    pub fn weak_secret(&self) -> bool {
        self.auth.jwt_secret == default_jwt_secret()
            || self.auth.jwt_secret.len() < MIN_SECRET_LENGTH
    }
}
