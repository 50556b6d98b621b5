//! Attempt service implementation
//!
//! Every public OTP request goes through [`AttemptService::evaluate_and_record`]:
//! the engine runs inside the store's atomic upsert, so the verdict and the
//! write it implies can never be split by a concurrent request.

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use og_shared::config::ThrottleConfig;

use crate::domain::entities::{AttemptRecord, AuditEventType, AuditLog, RequestMetadata};
use crate::domain::events::{ThrottleEvent, ThrottleEventKind, ThrottleEventPublisher};
use crate::domain::value_objects::{Decision, DenyReason, Identifier, StatusView};
use crate::errors::{DomainError, DomainResult, StorageError, StorageResult};
use crate::repositories::audit::NoOpAuditLogRepository;
use crate::repositories::{AttemptStore, AuditLogRepository, Upserted};
use crate::services::audit::AuditService;
use crate::services::clock::{Clock, SystemClock};
use crate::services::status::StatusProjector;
use crate::services::throttle::{Evaluation, ThrottleEngine, ThrottlePolicy};

use super::config::AttemptServiceConfig;

/// Throttled OTP issuance over an [`AttemptStore`]
pub struct AttemptService<S, A = NoOpAuditLogRepository>
where
    S: AttemptStore,
    A: AuditLogRepository + 'static,
{
    /// Attempt record persistence
    store: Arc<S>,
    /// Window/lock state machine
    engine: ThrottleEngine,
    /// Optional audit service for decisions and operator actions
    audit_service: Option<Arc<AuditService<A>>>,
    /// Dashboard notifications
    events: ThrottleEventPublisher,
    /// Time source for `request_code`
    clock: Arc<dyn Clock>,
    config: AttemptServiceConfig,
}

impl<S> AttemptService<S>
where
    S: AttemptStore,
{
    /// Create a new attempt service without audit logging
    pub fn new(store: Arc<S>, policy: ThrottlePolicy, config: AttemptServiceConfig) -> Self {
        Self::build(store, policy, None, config)
    }

    /// Build policy and runtime knobs from configuration
    pub fn from_config(store: Arc<S>, config: &ThrottleConfig) -> DomainResult<Self> {
        let policy = ThrottlePolicy::from_config(config)?;
        Ok(Self::new(store, policy, AttemptServiceConfig::from(config)))
    }
}

impl<S, A> AttemptService<S, A>
where
    S: AttemptStore,
    A: AuditLogRepository + 'static,
{
    /// Create a new attempt service with audit logging
    pub fn with_audit(
        store: Arc<S>,
        policy: ThrottlePolicy,
        audit_service: Arc<AuditService<A>>,
        config: AttemptServiceConfig,
    ) -> Self {
        Self::build(store, policy, Some(audit_service), config)
    }

    fn build(
        store: Arc<S>,
        policy: ThrottlePolicy,
        audit_service: Option<Arc<AuditService<A>>>,
        config: AttemptServiceConfig,
    ) -> Self {
        Self {
            store,
            engine: ThrottleEngine::new(policy),
            audit_service,
            events: ThrottleEventPublisher::new(config.event_channel_capacity),
            clock: Arc::new(SystemClock),
            config,
        }
    }

    /// Replace the time source used by `request_code`
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn policy(&self) -> &ThrottlePolicy {
        self.engine.policy()
    }

    pub fn config(&self) -> &AttemptServiceConfig {
        &self.config
    }

    pub fn events(&self) -> &ThrottleEventPublisher {
        &self.events
    }

    /// Receiver for state-change notifications
    pub fn subscribe(&self) -> broadcast::Receiver<ThrottleEvent> {
        self.events.subscribe()
    }

    pub fn audit_service(&self) -> Option<&Arc<AuditService<A>>> {
        self.audit_service.as_ref()
    }

    /// Current time from the injected clock
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Decide whether an OTP may be sent now and record the attempt
    ///
    /// Accounting is per request: an `Allow` consumes an attempt even if the
    /// SMS delivery that follows fails. Storage failures are returned as
    /// `DomainError::Storage`; callers must not treat them as `Allow`.
    pub async fn evaluate_and_record(
        &self,
        identifier: &Identifier,
        now: DateTime<Utc>,
        metadata: &RequestMetadata,
    ) -> DomainResult<Decision> {
        let engine = &self.engine;
        let Upserted {
            previous,
            record,
            output: evaluation,
        } = self
            .modify(identifier, "evaluate_and_record", |record| {
                engine.evaluate(record, now, metadata)
            })
            .await?;

        self.report_evaluation(identifier, previous.as_ref(), &record, &evaluation, now, metadata)
            .await;

        Ok(evaluation.decision)
    }

    /// [`Self::evaluate_and_record`] at the injected clock's current time
    pub async fn request_code(
        &self,
        identifier: &Identifier,
        metadata: &RequestMetadata,
    ) -> DomainResult<Decision> {
        self.evaluate_and_record(identifier, self.clock.now(), metadata)
            .await
    }

    /// Like [`Self::evaluate_and_record`] but any failure becomes
    /// `Deny(StorageUnavailable)`
    pub async fn evaluate_fail_closed(
        &self,
        identifier: &Identifier,
        now: DateTime<Utc>,
        metadata: &RequestMetadata,
    ) -> Decision {
        match self.evaluate_and_record(identifier, now, metadata).await {
            Ok(decision) => decision,
            Err(e) => {
                warn!(
                    identifier = %identifier.masked(),
                    error = %e,
                    "Failing closed on OTP request"
                );
                Decision::deny(DenyReason::StorageUnavailable, None)
            }
        }
    }

    /// Client-facing status; never writes
    pub async fn status(&self, identifier: &Identifier, now: DateTime<Utc>) -> DomainResult<StatusView> {
        let stored = self.load(identifier).await?;
        let record = match stored {
            Some(record) => self.engine.preview(&record, now),
            None => AttemptRecord::new(identifier.clone()),
        };
        Ok(StatusProjector::project(&record, now, self.engine.policy()))
    }

    /// Stored record including history; a fresh record for unknown identifiers
    pub async fn inspect(&self, identifier: &Identifier) -> DomainResult<AttemptRecord> {
        Ok(self
            .load(identifier)
            .await?
            .unwrap_or_else(|| AttemptRecord::new(identifier.clone())))
    }

    /// Delete the stored record; true when one existed
    pub async fn purge(&self, identifier: &Identifier) -> DomainResult<bool> {
        let result = self
            .bounded("delete", self.store.delete(identifier))
            .await;
        result.map_err(|e| self.storage_failure(identifier, "delete", e))
    }

    /// Atomic read-modify-write on one identifier, bounded by the store timeout
    pub(crate) async fn modify<F, T>(
        &self,
        identifier: &Identifier,
        operation: &'static str,
        mutate: F,
    ) -> DomainResult<Upserted<T>>
    where
        F: FnMut(&mut AttemptRecord) -> T + Send,
        T: Send,
    {
        let result = self
            .bounded(operation, self.store.upsert(identifier, mutate))
            .await;
        result.map_err(|e| self.storage_failure(identifier, operation, e))
    }

    pub(crate) fn publish(&self, identifier: &Identifier, kind: ThrottleEventKind, at: DateTime<Utc>) {
        self.events
            .publish(ThrottleEvent::new(identifier.clone(), kind, at));
    }

    pub(crate) async fn audit(&self, audit_log: AuditLog) {
        if let Some(audit) = &self.audit_service {
            audit.record(audit_log).await;
        }
    }

    async fn load(&self, identifier: &Identifier) -> DomainResult<Option<AttemptRecord>> {
        let result = self.bounded("get", self.store.get(identifier)).await;
        result.map_err(|e| self.storage_failure(identifier, "get", e))
    }

    async fn bounded<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = StorageResult<T>>,
    ) -> StorageResult<T> {
        match tokio::time::timeout(self.config.store_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(StorageError::Timeout {
                operation: operation.to_string(),
                timeout_ms: self.config.store_timeout_ms(),
            }),
        }
    }

    fn storage_failure(&self, identifier: &Identifier, operation: &str, err: StorageError) -> DomainError {
        error!(
            identifier = %identifier.masked(),
            operation,
            error = %err,
            "Attempt store operation failed"
        );
        DomainError::Storage(err)
    }

    async fn report_evaluation(
        &self,
        identifier: &Identifier,
        previous: Option<&AttemptRecord>,
        record: &AttemptRecord,
        evaluation: &Evaluation,
        now: DateTime<Utc>,
        metadata: &RequestMetadata,
    ) {
        if evaluation.lock_expired {
            debug!(identifier = %identifier.masked(), "Expired lock cleared");
            self.publish(identifier, ThrottleEventKind::LockExpired, now);
        }

        match &evaluation.decision {
            Decision::Allow { remaining_attempts } => {
                debug!(
                    identifier = %identifier.masked(),
                    remaining_attempts,
                    "OTP request allowed"
                );
                self.publish(
                    identifier,
                    ThrottleEventKind::AttemptAllowed {
                        remaining_attempts: *remaining_attempts,
                    },
                    now,
                );
                self.audit(
                    AuditLog::new(AuditEventType::SendCodeAllowed, identifier, now)
                        .with_request_context(metadata)
                        .with_event_data(json!({ "remainingAttempts": remaining_attempts })),
                )
                .await;
            }
            Decision::Deny { reason, .. } => {
                info!(
                    identifier = %identifier.masked(),
                    reason = reason.as_str(),
                    retry_after_seconds = ?evaluation.decision.retry_after_seconds(),
                    "OTP request denied"
                );
                self.publish(identifier, ThrottleEventKind::AttemptDenied { reason: *reason }, now);
                self.audit(
                    AuditLog::new(AuditEventType::SendCodeDenied, identifier, now)
                        .with_request_context(metadata)
                        .with_event_data(json!({
                            "reason": reason.as_str(),
                            "retryAfterSeconds": evaluation.decision.retry_after_seconds(),
                        })),
                )
                .await;
            }
        }

        let previous_lock = previous.and_then(|p| p.locked_until);
        if let Some(locked_until) = record.locked_until.filter(|until| previous_lock != Some(*until)) {
            warn!(
                identifier = %identifier.masked(),
                %locked_until,
                "Identifier locked after exceeding OTP attempts"
            );
            self.publish(identifier, ThrottleEventKind::LockEngaged { locked_until }, now);
            self.audit(
                AuditLog::new(AuditEventType::AccountLocked, identifier, now)
                    .with_request_context(metadata)
                    .with_event_data(json!({ "lockedUntil": locked_until })),
            )
            .await;
        }
    }
}
