//! Audit log entity for OTP throttling and operator actions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::domain::entities::attempt::RequestMetadata;
use crate::domain::value_objects::Identifier;

/// Event types recorded by the throttling engine
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditEventType {
    // Public path
    SendCodeAllowed,
    SendCodeDenied,
    AccountLocked,

    // Operator actions
    AdminBlocked,
    AdminUnblocked,
    AttemptsReset,
    AdminResendTriggered,
    RecordPurged,
}

impl AuditEventType {
    /// Convert to string representation for storage
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SendCodeAllowed => "SEND_CODE_ALLOWED",
            Self::SendCodeDenied => "SEND_CODE_DENIED",
            Self::AccountLocked => "ACCOUNT_LOCKED",
            Self::AdminBlocked => "ADMIN_BLOCKED",
            Self::AdminUnblocked => "ADMIN_UNBLOCKED",
            Self::AttemptsReset => "ATTEMPTS_RESET",
            Self::AdminResendTriggered => "ADMIN_RESEND_TRIGGERED",
            Self::RecordPurged => "RECORD_PURGED",
        }
    }

    /// Operator-initiated events
    pub fn is_administrative(&self) -> bool {
        matches!(
            self,
            Self::AdminBlocked
                | Self::AdminUnblocked
                | Self::AttemptsReset
                | Self::AdminResendTriggered
                | Self::RecordPurged
        )
    }
}

/// Audit log entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuditLog {
    pub id: Uuid,
    pub event_type: AuditEventType,
    /// Masked phone number (e.g. "+15****0100")
    pub phone_masked: String,
    /// SHA-256 of the canonical phone for correlation
    pub phone_hash: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    /// Free-form details (deny reason, lock end, ...)
    pub event_data: Option<JsonValue>,
    pub created_at: DateTime<Utc>,
}

impl AuditLog {
    pub fn new(event_type: AuditEventType, identifier: &Identifier, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_type,
            phone_masked: identifier.masked(),
            phone_hash: identifier.hashed(),
            ip_address: None,
            user_agent: None,
            event_data: None,
            created_at,
        }
    }

    /// Add request context (IP and user agent)
    pub fn with_request_context(mut self, metadata: &RequestMetadata) -> Self {
        self.ip_address = metadata.source_ip.clone();
        self.user_agent = metadata.user_agent.clone();
        self
    }

    /// Add event data as JSON
    pub fn with_event_data(mut self, data: JsonValue) -> Self {
        self.event_data = Some(data);
        self
    }
}
