//! Shared setup for service tests

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use statboard_auth::{AuthUser, JwtManager, TokenConfig};
use statboard_core::{
    AuditFailure, AuditRecorder, AuthService, LoginFailurePolicy, Registration,
};
use statboard_db::{
    AuditLogEntry, AuditLogQuery, CredentialStore, Database, DbError, NewAuditLog, NewUser, Role,
    User,
};
use std::sync::Arc;
use tempfile::TempDir;

pub const SECRET: &str = "service-test-secret";

/// Store whose audit writes always fail; user operations delegate to SQLite
pub struct BrokenAuditStore {
    pub inner: Database,
}

#[async_trait]
impl CredentialStore for BrokenAuditStore {
    async fn create_user(&self, user: NewUser) -> Result<User, DbError> {
        self.inner.create_user(user).await
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DbError> {
        self.inner.find_user_by_email(email).await
    }

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, DbError> {
        self.inner.find_user_by_id(id).await
    }

    async fn list_users(&self) -> Result<Vec<User>, DbError> {
        CredentialStore::list_users(&self.inner).await
    }

    async fn update_user_role(&self, id: i64, role: Role) -> Result<bool, DbError> {
        CredentialStore::update_user_role(&self.inner, id, role).await
    }

    async fn delete_user(&self, id: i64) -> Result<bool, DbError> {
        CredentialStore::delete_user(&self.inner, id).await
    }

    async fn count_users(&self) -> Result<i64, DbError> {
        CredentialStore::count_users(&self.inner).await
    }

    async fn append_audit_log(&self, _log: NewAuditLog) -> Result<AuditLogEntry, DbError> {
        Err(DbError::Connection(sqlx::Error::PoolClosed))
    }

    async fn list_audit_logs(
        &self,
        query: AuditLogQuery,
    ) -> Result<(Vec<AuditLogEntry>, i64), DbError> {
        CredentialStore::list_audit_logs(&self.inner, query).await
    }
}

/// Store whose user reads and writes time out; everything else delegates
pub struct UnavailableStore {
    pub inner: Database,
}

#[async_trait]
impl CredentialStore for UnavailableStore {
    async fn create_user(&self, _user: NewUser) -> Result<User, DbError> {
        Err(DbError::Connection(sqlx::Error::PoolTimedOut))
    }

    async fn find_user_by_email(&self, _email: &str) -> Result<Option<User>, DbError> {
        Err(DbError::Connection(sqlx::Error::PoolTimedOut))
    }

    async fn find_user_by_id(&self, _id: i64) -> Result<Option<User>, DbError> {
        Err(DbError::Connection(sqlx::Error::PoolTimedOut))
    }

    async fn list_users(&self) -> Result<Vec<User>, DbError> {
        CredentialStore::list_users(&self.inner).await
    }

    async fn update_user_role(&self, id: i64, role: Role) -> Result<bool, DbError> {
        CredentialStore::update_user_role(&self.inner, id, role).await
    }

    async fn delete_user(&self, id: i64) -> Result<bool, DbError> {
        CredentialStore::delete_user(&self.inner, id).await
    }

    async fn count_users(&self) -> Result<i64, DbError> {
        CredentialStore::count_users(&self.inner).await
    }

    async fn append_audit_log(&self, log: NewAuditLog) -> Result<AuditLogEntry, DbError> {
        self.inner.append_audit_log(log).await
    }

    async fn list_audit_logs(
        &self,
        query: AuditLogQuery,
    ) -> Result<(Vec<AuditLogEntry>, i64), DbError> {
        CredentialStore::list_audit_logs(&self.inner, query).await
    }
}

pub struct Harness {
    pub db: Database,
    pub jwt: Arc<JwtManager>,
    pub service: AuthService,
    pub failures: Arc<Mutex<Vec<AuditFailure>>>,
    _dir: Option<TempDir>,
}

impl Harness {
    pub async fn new() -> Self {
        Self::with_policy(LoginFailurePolicy::Distinct).await
    }

    pub async fn with_policy(policy: LoginFailurePolicy) -> Self {
        let db = Database::in_memory().await.unwrap();
        Self::build(db.clone(), Arc::new(db), policy)
    }

    /// Service whose audit writes fail
    pub async fn with_broken_audit() -> Self {
        let db = Database::in_memory().await.unwrap();
        let store = Arc::new(BrokenAuditStore { inner: db.clone() });
        Self::build(db, store, LoginFailurePolicy::Distinct)
    }

    /// Service whose user lookups and inserts fail
    pub async fn with_unavailable_store() -> Self {
        let db = Database::in_memory().await.unwrap();
        let store = Arc::new(UnavailableStore { inner: db.clone() });
        Self::build(db, store, LoginFailurePolicy::Distinct)
    }

    /// Service over a SQLite file, with a pool of several connections
    pub async fn on_disk() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite:{}?mode=rwc", dir.path().join("statboard.db").display());
        let db = Database::new(&url).await.unwrap();
        let mut harness = Self::build(db.clone(), Arc::new(db), LoginFailurePolicy::Distinct);
        harness._dir = Some(dir);
        harness
    }

    fn build(db: Database, store: Arc<dyn CredentialStore>, policy: LoginFailurePolicy) -> Self {
        let jwt = Arc::new(JwtManager::new(TokenConfig::new(SECRET)));
        let failures: Arc<Mutex<Vec<AuditFailure>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = failures.clone();
        let audit = AuditRecorder::new(store.clone())
            .with_error_hook(Arc::new(move |failure: &AuditFailure| {
                sink.lock().push(failure.clone());
            }));
        let service = AuthService::new(store, jwt.clone(), audit, policy);

        Self {
            db,
            jwt,
            service,
            failures,
            _dir: None,
        }
    }

    pub async fn register(&self, name: &str, email: &str, password: &str) -> i64 {
        self.service
            .register(Registration {
                name: name.to_string(),
                email: email.to_string(),
                password: password.to_string(),
                role: None,
            })
            .await
            .unwrap()
    }

    pub async fn register_as(&self, email: &str, role: Role) -> AuthUser {
        let id = self
            .service
            .register(Registration {
                name: "Someone".to_string(),
                email: email.to_string(),
                password: "password".to_string(),
                role: Some(role.as_str().to_string()),
            })
            .await
            .unwrap();
        AuthUser { id, role }
    }
}

pub fn registration(name: &str, email: &str, password: &str) -> Registration {
    Registration {
        name: name.to_string(),
        email: email.to_string(),
        password: password.to_string(),
        role: None,
    }
}
