//! Best-effort audit recording
//!
//! Writes are detached from the request that triggered them. A failed write
//! is logged and reported to the error hook, never to the caller.

use statboard_db::{AuditAction, CredentialStore, NewAuditLog};
use std::fmt;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::task::TaskTracker;
use tracing::{debug, warn};

/// Details of an audit write that did not land
#[derive(Debug, Clone)]
pub struct AuditFailure {
    pub user_id: Option<i64>,
    pub action: AuditAction,
    pub error: String,
}

/// Callback observing failed audit writes
pub type AuditErrorHook = Arc<dyn Fn(&AuditFailure) + Send + Sync>;

/// Spawns audit writes and tracks them until they finish
#[derive(Clone)]
pub struct AuditRecorder {
    store: Arc<dyn CredentialStore>,
    tracker: TaskTracker,
    on_error: Option<AuditErrorHook>,
}

impl fmt::Debug for AuditRecorder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuditRecorder")
            .field("in_flight", &self.tracker.len())
            .field("has_error_hook", &self.on_error.is_some())
            .finish()
    }
}

impl AuditRecorder {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self {
            store,
            tracker: TaskTracker::new(),
            on_error: None,
        }
    }

    /// Install a hook called for every failed write
    pub fn with_error_hook(mut self, hook: AuditErrorHook) -> Self {
        self.on_error = Some(hook);
        self
    }

    /// Record an event without waiting for the write
    ///
    /// Must be called from within a Tokio runtime.
    pub fn record(
        &self,
        user_id: Option<i64>,
        action: AuditAction,
        details: impl Into<String>,
    ) -> JoinHandle<()> {
        let store = self.store.clone();
        let on_error = self.on_error.clone();
        let entry = NewAuditLog {
            user_id,
            action,
            details: Some(details.into()),
        };

        self.tracker.spawn(async move {
            match store.append_audit_log(entry).await {
                Ok(log) => debug!("Audit entry {} recorded: {}", log.id, log.action),
                Err(e) => {
                    warn!("Failed to record audit entry {} for {:?}: {}", action, user_id, e);
                    metrics::counter!("statboard_audit_failures_total").increment(1);
                    if let Some(hook) = on_error {
                        hook(&AuditFailure {
                            user_id,
                            action,
                            error: e.to_string(),
                        });
                    }
                }
            }
        })
    }

    /// Number of writes still running
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Wait until every write spawned so far has finished
    pub async fn flush(&self) {
        self.tracker.close();
        self.tracker.wait().await;
        self.tracker.reopen();
    }

    /// Wait for outstanding writes before shutdown
    pub async fn shutdown(&self) {
        self.tracker.close();
        self.tracker.wait().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use statboard_db::{AuditLogQuery, Database};

    #[tokio::test]
    async fn test_record_and_flush() {
        let db = Database::in_memory().await.unwrap();
        let recorder = AuditRecorder::new(Arc::new(db.clone()));

        recorder.record(Some(1), AuditAction::Register, "Ada registered");
        recorder.record(Some(1), AuditAction::Login, "Ada logged in");
        recorder.flush().await;

        assert_eq!(recorder.in_flight(), 0);
        let (logs, total) = db.list_audit_logs(AuditLogQuery::default()).await.unwrap();
        assert_eq!(total, 2);
        assert!(logs.iter().any(|l| l.action == AuditAction::Login));

        // Still usable after a flush
        recorder.record(None, AuditAction::Login, "again");
        recorder.shutdown().await;
        let (_, total) = db.list_audit_logs(AuditLogQuery::default()).await.unwrap();
        assert_eq!(total, 3);
    }
}
