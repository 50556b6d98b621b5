//! Admin override service
//!
//! Every action is a single atomic upsert through the same store the public
//! path uses, so an override and a concurrent OTP request never interleave.
//! Actions against unknown identifiers create the record in the target state.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::domain::entities::{
    AttemptEvent, AttemptKind, AttemptRecord, AuditEventType, AuditLog, IdentifierState,
    RequestMetadata,
};
use crate::domain::events::ThrottleEventKind;
use crate::domain::value_objects::Identifier;
use crate::errors::DomainResult;
use crate::repositories::audit::NoOpAuditLogRepository;
use crate::repositories::{AttemptStore, AuditLogRepository};
use crate::services::attempt::AttemptService;

/// Operator action kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminAction {
    Block,
    Unblock,
    ResetAttempts,
    TriggerResend,
    Purge,
}

impl AdminAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Block => "block",
            Self::Unblock => "unblock",
            Self::ResetAttempts => "reset_attempts",
            Self::TriggerResend => "trigger_resend",
            Self::Purge => "purge",
        }
    }

    fn audit_event(&self) -> AuditEventType {
        match self {
            Self::Block => AuditEventType::AdminBlocked,
            Self::Unblock => AuditEventType::AdminUnblocked,
            Self::ResetAttempts => AuditEventType::AttemptsReset,
            Self::TriggerResend => AuditEventType::AdminResendTriggered,
            Self::Purge => AuditEventType::RecordPurged,
        }
    }

    fn event_kind(&self) -> ThrottleEventKind {
        match self {
            Self::Block => ThrottleEventKind::Blocked,
            Self::Unblock => ThrottleEventKind::Unblocked,
            Self::ResetAttempts => ThrottleEventKind::Reset,
            Self::TriggerResend => ThrottleEventKind::ResendTriggered,
            Self::Purge => ThrottleEventKind::Purged,
        }
    }
}

/// Acknowledgement returned to the console after an override
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminAck {
    pub identifier: Identifier,
    pub action: AdminAction,
    /// Visible state right after the action
    pub state: IdentifierState,
    pub at: DateTime<Utc>,
}

/// Block, unblock, reset and manual resend for a single identifier
pub struct AdminOverride<S, A = NoOpAuditLogRepository>
where
    S: AttemptStore,
    A: AuditLogRepository + 'static,
{
    attempts: Arc<AttemptService<S, A>>,
}

impl<S, A> Clone for AdminOverride<S, A>
where
    S: AttemptStore,
    A: AuditLogRepository + 'static,
{
    fn clone(&self) -> Self {
        Self {
            attempts: Arc::clone(&self.attempts),
        }
    }
}

impl<S, A> AdminOverride<S, A>
where
    S: AttemptStore,
    A: AuditLogRepository + 'static,
{
    pub fn new(attempts: Arc<AttemptService<S, A>>) -> Self {
        Self { attempts }
    }

    /// Deny every public request until unblocked; counters are untouched
    pub async fn block(&self, identifier: &Identifier, at: DateTime<Utc>) -> DomainResult<AdminAck> {
        self.apply(identifier, AdminAction::Block, at, &RequestMetadata::default(), |record| {
            record.admin_blocked = true;
        })
        .await
    }

    /// Clear the operator block; a temporary lock still in force stays
    pub async fn unblock(&self, identifier: &Identifier, at: DateTime<Utc>) -> DomainResult<AdminAck> {
        self.apply(identifier, AdminAction::Unblock, at, &RequestMetadata::default(), |record| {
            record.admin_blocked = false;
        })
        .await
    }

    /// Clear count, window and lock; history and the operator block survive
    pub async fn reset_attempts(&self, identifier: &Identifier, at: DateTime<Utc>) -> DomainResult<AdminAck> {
        self.apply(
            identifier,
            AdminAction::ResetAttempts,
            at,
            &RequestMetadata::default(),
            AttemptRecord::clear_counters,
        )
        .await
    }

    /// Record an operator-initiated send; bypasses throttling and is not counted against the window
    pub async fn trigger_resend(
        &self,
        identifier: &Identifier,
        at: DateTime<Utc>,
        metadata: &RequestMetadata,
    ) -> DomainResult<AdminAck> {
        let capacity = self.attempts.policy().history_capacity();
        self.apply(identifier, AdminAction::TriggerResend, at, metadata, |record| {
            record.push_event(AttemptEvent::new(at, AttemptKind::AdminTriggered, metadata), capacity);
        })
        .await
    }

    /// Full stored record including history
    pub async fn inspect(&self, identifier: &Identifier) -> DomainResult<AttemptRecord> {
        self.attempts.inspect(identifier).await
    }

    /// Drop all stored state for an identifier
    pub async fn purge(&self, identifier: &Identifier, at: DateTime<Utc>) -> DomainResult<AdminAck> {
        let existed = self.attempts.purge(identifier).await?;
        let action = AdminAction::Purge;

        info!(
            identifier = %identifier.masked(),
            action = action.as_str(),
            existed,
            "Admin override applied"
        );
        self.attempts.publish(identifier, action.event_kind(), at);
        self.attempts
            .audit(AuditLog::new(action.audit_event(), identifier, at).with_event_data(json!({ "existed": existed })))
            .await;

        Ok(AdminAck {
            identifier: identifier.clone(),
            action,
            state: IdentifierState::Unlocked,
            at,
        })
    }

    /// Recent audit entries for an identifier, newest first
    ///
    /// Empty when the attempt service runs without an audit service.
    pub async fn audit_trail(&self, identifier: &Identifier, limit: usize) -> DomainResult<Vec<AuditLog>> {
        match self.attempts.audit_service() {
            Some(audit) => audit.recent_for(identifier, limit).await,
            None => Ok(Vec::new()),
        }
    }

    async fn apply<F>(
        &self,
        identifier: &Identifier,
        action: AdminAction,
        at: DateTime<Utc>,
        metadata: &RequestMetadata,
        mutate: F,
    ) -> DomainResult<AdminAck>
    where
        F: FnMut(&mut AttemptRecord) + Send,
    {
        let upserted = self
            .attempts
            .modify(identifier, action.as_str(), mutate)
            .await?;
        let state = upserted.record.state_at(at);

        info!(
            identifier = %identifier.masked(),
            action = action.as_str(),
            ?state,
            "Admin override applied"
        );
        self.attempts.publish(identifier, action.event_kind(), at);
        self.attempts
            .audit(
                AuditLog::new(action.audit_event(), identifier, at)
                    .with_request_context(metadata)
                    .with_event_data(json!({
                        "attemptCount": upserted.record.attempt_count,
                        "lockedUntil": upserted.record.locked_until,
                        "adminBlocked": upserted.record.admin_blocked,
                    })),
            )
            .await;

        Ok(AdminAck {
            identifier: identifier.clone(),
            action,
            state,
            at,
        })
    }
}
