//! Throttle decision logic.
//!
//! The engine never touches storage. It advances an `AttemptRecord` in place
//! and returns the verdict; the caller persists the record inside the same
//! atomic store operation that produced it.

use chrono::{DateTime, Utc};

use crate::domain::entities::{AttemptEvent, AttemptKind, AttemptRecord, RequestMetadata};
use crate::domain::value_objects::{Decision, DenyReason};

use super::policy::ThrottlePolicy;

/// Verdict plus the lazy transitions applied while reaching it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub decision: Decision,
    /// An expired lock was cleared during this evaluation
    pub lock_expired: bool,
}

/// Window/lock state machine for one identifier
#[derive(Debug, Clone, Default)]
pub struct ThrottleEngine {
    policy: ThrottlePolicy,
}

impl ThrottleEngine {
    pub fn new(policy: ThrottlePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ThrottlePolicy {
        &self.policy
    }

    /// Evaluate one public OTP request and advance `record` accordingly
    pub fn evaluate(
        &self,
        record: &mut AttemptRecord,
        now: DateTime<Utc>,
        metadata: &RequestMetadata,
    ) -> Evaluation {
        if record.admin_blocked {
            return Evaluation {
                decision: Decision::deny(DenyReason::Blocked, None),
                lock_expired: false,
            };
        }

        if let Some(until) = record.locked_until {
            if now < until {
                return Evaluation {
                    decision: Decision::deny(DenyReason::Cooldown, Some(until - now)),
                    lock_expired: false,
                };
            }
        }

        let lock_expired = self.normalize(record, now);
        let max = self.policy.max_attempts_per_window();

        if record.attempt_count.saturating_add(1) > max {
            let lock = self.policy.lock_duration();
            let until = now.checked_add_signed(lock).unwrap_or(DateTime::<Utc>::MAX_UTC);
            record.locked_until = Some(until);
            return Evaluation {
                decision: Decision::deny(DenyReason::TooManyAttempts, Some(lock)),
                lock_expired,
            };
        }

        let kind = if record.attempt_count == 0 {
            AttemptKind::Initial
        } else {
            AttemptKind::Resend
        };
        record.attempt_count += 1;
        record.last_attempt_at = Some(now);
        record.push_event(
            AttemptEvent::new(now, kind, metadata),
            self.policy.history_capacity(),
        );

        Evaluation {
            decision: Decision::allow(max - record.attempt_count),
            lock_expired,
        }
    }

    /// Apply lazy lock expiry and window roll-over without consuming an attempt
    ///
    /// Returns true when an expired lock was cleared. A lock still in force
    /// is left alone.
    pub fn normalize(&self, record: &mut AttemptRecord, now: DateTime<Utc>) -> bool {
        let mut lock_expired = false;

        match record.locked_until {
            Some(until) if now >= until => {
                record.attempt_count = 0;
                record.window_started_at = Some(now);
                record.locked_until = None;
                lock_expired = true;
            }
            Some(_) => return false,
            None => {}
        }

        let window_elapsed = match record.window_started_at {
            None => true,
            Some(started) => now - started > self.policy.window_duration(),
        };
        if window_elapsed {
            record.window_started_at = Some(now);
            record.attempt_count = 0;
        }

        lock_expired
    }

    /// Normalized copy of `record` as of `now`, for read paths
    pub fn preview(&self, record: &AttemptRecord, now: DateTime<Utc>) -> AttemptRecord {
        let mut preview = record.clone();
        self.normalize(&mut preview, now);
        preview
    }

    /// Verdict the next request would receive, without mutating anything
    pub fn dry_run(&self, record: &AttemptRecord, now: DateTime<Utc>) -> Decision {
        let mut scratch = record.clone();
        self.evaluate(&mut scratch, now, &RequestMetadata::default())
            .decision
    }
}
