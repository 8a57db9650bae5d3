//! Authentication service
//!
//! Orchestrates the credential store, password hasher and token issuer.
//! Every failure leaves the service as a [`ServiceError`] the caller can
//! branch on; audit writes are fire-and-forget.

use serde::{Deserialize, Serialize};
use statboard_auth::{
    AuthUser, DUMMY_HASH, JwtManager, hash_password_async, verify_password_async,
};
use statboard_db::{
    AuditAction, AuditLogEntry, AuditLogQuery, CredentialStore, NewUser, Role, UserSummary,
};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info};

use crate::audit::AuditRecorder;
use crate::error::ServiceError;

/// How login reports an unknown email
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoginFailurePolicy {
    /// Unknown email is `NotFound`, wrong password is `InvalidCredential`
    #[default]
    Distinct,
    /// Both are `InvalidCredential`, with equal verification cost
    Collapsed,
}

impl FromStr for LoginFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "distinct" => Ok(LoginFailurePolicy::Distinct),
            "collapsed" => Ok(LoginFailurePolicy::Collapsed),
            _ => Err(format!("Invalid login failure policy: {}", s)),
        }
    }
}

/// Input to [`AuthService::register`]
#[derive(Debug, Clone, Default)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Option<String>,
}

/// Result of a successful login
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: String,
    pub expires_in: i64,
    pub user: UserSummary,
}

/// Authentication service
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    jwt: Arc<JwtManager>,
    audit: AuditRecorder,
    login_policy: LoginFailurePolicy,
}

/// Reject empty or whitespace-only input before it reaches the store
fn require<'a>(field: &'static str, value: &'a str) -> Result<&'a str, ServiceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::MissingField(field));
    }
    Ok(trimmed)
}

fn parse_role(value: &str) -> Result<Role, ServiceError> {
    Role::from_str(value).map_err(|_| ServiceError::InvalidRole(value.to_string()))
}

fn require_admin(caller: &AuthUser) -> Result<(), ServiceError> {
    if !caller.role.is_admin() {
        debug!("User {} ({}) denied admin operation", caller.id, caller.role);
        return Err(ServiceError::Forbidden);
    }
    Ok(())
}

impl AuthService {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        jwt: Arc<JwtManager>,
        audit: AuditRecorder,
        login_policy: LoginFailurePolicy,
    ) -> Self {
        Self {
            store,
            jwt,
            audit,
            login_policy,
        }
    }

    pub fn audit(&self) -> &AuditRecorder {
        &self.audit
    }

    pub fn login_policy(&self) -> LoginFailurePolicy {
        self.login_policy
    }

    /// Register a new account, returning its ID
    ///
    /// The role defaults to `User`. Duplicate emails are caught by the store's
    /// uniqueness constraint, not by a lookup here.
    pub async fn register(&self, registration: Registration) -> Result<i64, ServiceError> {
        let name = require("name", &registration.name)?;
        let email = require("email", &registration.email)?;
        if registration.password.is_empty() {
            return Err(ServiceError::MissingField("password"));
        }
        let role = match registration.role.as_deref() {
            Some(role) => parse_role(role)?,
            None => Role::User,
        };

        debug!("Registering user: {}", email);

        let password_hash = hash_password_async(registration.password)
            .await
            .map_err(ServiceError::Internal)?;

        let user = self
            .store
            .create_user(NewUser {
                name: name.to_string(),
                email: email.to_string(),
                password_hash,
                role,
            })
            .await?;

        info!("Registered user {} ({})", user.id, user.role);
        metrics::counter!("statboard_registrations_total").increment(1);

        self.audit.record(
            Some(user.id),
            AuditAction::Register,
            format!("User registered: {}", user.email),
        );

        Ok(user.id)
    }

    /// Exchange email and password for a session token
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, ServiceError> {
        let email = require("email", email)?;
        if password.is_empty() {
            return Err(ServiceError::MissingField("password"));
        }

        debug!("Login attempt for: {}", email);

        let user = match self.store.find_user_by_email(email).await? {
            Some(user) => user,
            None => {
                metrics::counter!("statboard_logins_total", "outcome" => "unknown_email")
                    .increment(1);
                return match self.login_policy {
                    LoginFailurePolicy::Distinct => {
                        Err(ServiceError::NotFound(format!("User: {}", email)))
                    }
                    LoginFailurePolicy::Collapsed => {
                        // Spend the same effort as a real verification
                        let _ = verify_password_async(password.to_string(), DUMMY_HASH.to_string())
                            .await;
                        Err(ServiceError::InvalidCredential)
                    }
                };
            }
        };

        let valid = verify_password_async(password.to_string(), user.password_hash.clone())
            .await
            .map_err(ServiceError::Internal)?;
        if !valid {
            metrics::counter!("statboard_logins_total", "outcome" => "invalid_credential")
                .increment(1);
            return Err(ServiceError::InvalidCredential);
        }

        let token = self
            .jwt
            .generate_token(user.id, user.role)
            .map_err(ServiceError::Internal)?;

        info!("User {} logged in", user.id);
        metrics::counter!("statboard_logins_total", "outcome" => "success").increment(1);

        self.audit.record(
            Some(user.id),
            AuditAction::Login,
            format!("User logged in: {}", user.email),
        );

        Ok(LoginOutcome {
            token,
            expires_in: self.jwt.validity().num_seconds(),
            user: user.summary(),
        })
    }

    /// Resolve a bearer token to the current state of its user
    pub async fn verify_session(&self, token: &str) -> Result<UserSummary, ServiceError> {
        let claims = self
            .jwt
            .validate_token(token)
            .map_err(ServiceError::Unauthenticated)?;
        let user_id = claims.user_id().map_err(ServiceError::Unauthenticated)?;

        self.store
            .find_user_by_id(user_id)
            .await?
            .map(UserSummary::from)
            .ok_or_else(|| ServiceError::NotFound(format!("User: {}", user_id)))
    }

    /// List every account (Admin only)
    pub async fn list_users(&self, caller: &AuthUser) -> Result<Vec<UserSummary>, ServiceError> {
        require_admin(caller)?;
        let users = self.store.list_users().await?;
        Ok(users.into_iter().map(UserSummary::from).collect())
    }

    /// Fetch one account (Admin only)
    pub async fn get_user(&self, caller: &AuthUser, id: i64) -> Result<UserSummary, ServiceError> {
        require_admin(caller)?;
        self.store
            .find_user_by_id(id)
            .await?
            .map(UserSummary::from)
            .ok_or_else(|| ServiceError::NotFound(format!("User: {}", id)))
    }

    /// Delete another account (Admin only, never the caller's own)
    pub async fn delete_user(&self, caller: &AuthUser, id: i64) -> Result<(), ServiceError> {
        require_admin(caller)?;
        if id == caller.id {
            return Err(ServiceError::InvalidOperation(
                "Administrators cannot delete their own account".to_string(),
            ));
        }

        debug!("Deleting user: {}", id);

        if !self.store.delete_user(id).await? {
            return Err(ServiceError::NotFound(format!("User: {}", id)));
        }

        info!("User {} deleted by {}", id, caller.id);
        self.audit.record(
            Some(caller.id),
            AuditAction::UserDeleted,
            format!("Deleted user {}", id),
        );
        Ok(())
    }

    /// Change another account's role (Admin only, never the caller's own)
    pub async fn change_role(
        &self,
        caller: &AuthUser,
        id: i64,
        new_role: &str,
    ) -> Result<Role, ServiceError> {
        require_admin(caller)?;
        if id == caller.id {
            return Err(ServiceError::InvalidOperation(
                "Administrators cannot change their own role".to_string(),
            ));
        }
        let role = parse_role(new_role)?;

        debug!("Changing role of user {} to {}", id, role);

        if !self.store.update_user_role(id, role).await? {
            return Err(ServiceError::NotFound(format!("User: {}", id)));
        }

        info!("User {} role set to {} by {}", id, role, caller.id);
        self.audit.record(
            Some(caller.id),
            AuditAction::RoleChanged,
            format!("Changed role of user {} to {}", id, role),
        );
        Ok(role)
    }

    /// Page through the audit trail (Admin only)
    pub async fn list_audit_logs(
        &self,
        caller: &AuthUser,
        query: AuditLogQuery,
    ) -> Result<(Vec<AuditLogEntry>, i64), ServiceError> {
        require_admin(caller)?;
        Ok(self.store.list_audit_logs(query).await?)
    }

    /// Create an Admin account when the store holds no users yet
    ///
    /// Returns the new account's ID, or `None` if users already exist.
    pub async fn bootstrap_admin(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Option<i64>, ServiceError> {
        if self.store.count_users().await? > 0 {
            return Ok(None);
        }

        let id = self
            .register(Registration {
                name: name.to_string(),
                email: email.to_string(),
                password: password.to_string(),
                role: Some(Role::Admin.as_str().to_string()),
            })
            .await?;
        Ok(Some(id))
    }
}
