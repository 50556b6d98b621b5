//! In-memory implementation of AuditLogRepository for tests and local runs.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use super::AuditLogRepository;
use crate::domain::entities::audit::AuditLog;
use crate::errors::DomainError;

/// Stores entries in a vector; can be switched into a failing mode
#[derive(Default)]
pub struct MockAuditLogRepository {
    logs: Arc<Mutex<Vec<AuditLog>>>,
    should_fail: AtomicBool,
}

impl MockAuditLogRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether writes should fail
    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }

    /// All stored logs, oldest first
    pub fn get_all_logs(&self) -> Vec<AuditLog> {
        self.logs
            .lock()
            .map(|logs| logs.clone())
            .unwrap_or_default()
    }

    fn fail(&self) -> Result<(), DomainError> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(DomainError::Internal {
                message: "audit backend unavailable".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl AuditLogRepository for MockAuditLogRepository {
    async fn create(&self, audit_log: &AuditLog) -> Result<(), DomainError> {
        self.fail()?;
        let mut logs = self.logs.lock().map_err(|_| DomainError::Internal {
            message: "audit log mutex poisoned".to_string(),
        })?;
        logs.push(audit_log.clone());
        Ok(())
    }

    async fn find_by_phone_hash(
        &self,
        phone_hash: &str,
        limit: usize,
    ) -> Result<Vec<AuditLog>, DomainError> {
        self.fail()?;
        let mut matches: Vec<AuditLog> = self
            .get_all_logs()
            .into_iter()
            .filter(|log| log.phone_hash == phone_hash)
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        matches.truncate(limit);
        Ok(matches)
    }
}
