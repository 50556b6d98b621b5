//! Audit service for recording throttling decisions and operator actions.
//!
//! Writes are fail-open: an unavailable audit backend is logged and swallowed
//! so it can never change a throttle verdict or block an admin override.

use std::sync::Arc;

use tokio::task;
use tracing::warn;

use crate::domain::entities::AuditLog;
use crate::domain::value_objects::Identifier;
use crate::errors::DomainResult;
use crate::repositories::AuditLogRepository;

/// Configuration for the audit service
#[derive(Debug, Clone)]
pub struct AuditServiceConfig {
    /// Whether to run audit writes asynchronously
    pub async_writes: bool,
}

impl Default for AuditServiceConfig {
    fn default() -> Self {
        Self { async_writes: true }
    }
}

/// Service for writing and reading the audit trail
pub struct AuditService<R>
where
    R: AuditLogRepository,
{
    repository: Arc<R>,
    config: AuditServiceConfig,
}

impl<R> Clone for AuditService<R>
where
    R: AuditLogRepository,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            config: self.config.clone(),
        }
    }
}

impl<R> AuditService<R>
where
    R: AuditLogRepository + 'static,
{
    /// Create a new audit service
    pub fn new(repository: Arc<R>, config: AuditServiceConfig) -> Self {
        Self { repository, config }
    }

    /// Record an entry
    ///
    /// With `async_writes` the write happens in a background task; otherwise
    /// it is awaited. Either way a failure only produces a warning.
    pub async fn record(&self, audit_log: AuditLog) {
        if self.config.async_writes {
            let repository = Arc::clone(&self.repository);
            task::spawn(async move {
                if let Err(e) = repository.create(&audit_log).await {
                    warn!(
                        event_type = audit_log.event_type.as_str(),
                        phone = %audit_log.phone_masked,
                        error = %e,
                        "Failed to write audit log"
                    );
                }
            });
        } else if let Err(e) = self.repository.create(&audit_log).await {
            warn!(
                event_type = audit_log.event_type.as_str(),
                phone = %audit_log.phone_masked,
                error = %e,
                "Failed to write audit log"
            );
        }
    }

    /// Recent entries for an identifier, newest first
    pub async fn recent_for(&self, identifier: &Identifier, limit: usize) -> DomainResult<Vec<AuditLog>> {
        self.repository
            .find_by_phone_hash(&identifier.hashed(), limit)
            .await
    }
}
