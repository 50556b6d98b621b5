//! Allow/deny verdict returned for a single OTP request.

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Why a request was denied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    /// Operator block, no retry hint
    Blocked,
    /// A lock is already in force
    Cooldown,
    /// This request crossed the window limit and engaged a lock
    TooManyAttempts,
    /// The store failed and the caller chose to fail closed
    StorageUnavailable,
}

impl DenyReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DenyReason::Blocked => "blocked",
            DenyReason::Cooldown => "cooldown",
            DenyReason::TooManyAttempts => "too_many_attempts",
            DenyReason::StorageUnavailable => "storage_unavailable",
        }
    }
}

/// Engine verdict for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow {
        remaining_attempts: u32,
    },
    Deny {
        reason: DenyReason,
        retry_after: Option<Duration>,
    },
}

impl Decision {
    pub fn allow(remaining_attempts: u32) -> Self {
        Decision::Allow { remaining_attempts }
    }

    pub fn deny(reason: DenyReason, retry_after: Option<Duration>) -> Self {
        Decision::Deny { reason, retry_after }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow { .. })
    }

    pub fn reason(&self) -> Option<DenyReason> {
        match self {
            Decision::Allow { .. } => None,
            Decision::Deny { reason, .. } => Some(*reason),
        }
    }

    pub fn remaining_attempts(&self) -> Option<u32> {
        match self {
            Decision::Allow { remaining_attempts } => Some(*remaining_attempts),
            Decision::Deny { .. } => None,
        }
    }

    /// Whole seconds until a retry can succeed, rounded up
    pub fn retry_after_seconds(&self) -> Option<i64> {
        match self {
            Decision::Deny {
                retry_after: Some(wait),
                ..
            } => Some(ceil_seconds(*wait)),
            _ => None,
        }
    }

    /// Client-safe wire shape
    pub fn to_payload(&self) -> DecisionPayload {
        DecisionPayload {
            allowed: self.is_allowed(),
            remaining_attempts: self.remaining_attempts(),
            retry_after_seconds: self.retry_after_seconds(),
            reason: self.reason(),
        }
    }
}

/// Serialized decision for the public OTP endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionPayload {
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_attempts: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_seconds: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<DenyReason>,
}

impl From<&Decision> for DecisionPayload {
    fn from(decision: &Decision) -> Self {
        decision.to_payload()
    }
}

/// Round a positive duration up to whole seconds; never below one
pub(crate) fn ceil_seconds(wait: Duration) -> i64 {
    let millis = wait.num_milliseconds();
    if millis <= 0 {
        return 1;
    }
    ((millis + 999) / 1000).max(1)
}
