//! Audit log repository trait defining the interface for audit log persistence.

use async_trait::async_trait;

use crate::domain::entities::audit::AuditLog;
use crate::errors::DomainError;

/// Repository trait for AuditLog persistence
///
/// The audit trail is a side channel: callers log and suppress failures so a
/// slow or broken audit backend never blocks a throttling decision.
#[async_trait]
pub trait AuditLogRepository: Send + Sync {
    /// Create a new audit log entry
    async fn create(&self, audit_log: &AuditLog) -> Result<(), DomainError>;

    /// Entries for a hashed phone, newest first
    async fn find_by_phone_hash(
        &self,
        phone_hash: &str,
        limit: usize,
    ) -> Result<Vec<AuditLog>, DomainError>;
}
