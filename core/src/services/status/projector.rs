//! Builds the client-safe `StatusView` from an attempt record.

use chrono::{DateTime, Utc};

use crate::domain::entities::{AttemptRecord, IdentifierState};
use crate::domain::value_objects::decision::ceil_seconds;
use crate::domain::value_objects::StatusView;
use crate::services::throttle::ThrottlePolicy;

/// Read-only view builder
///
/// Expects a record already normalized to `now` (see `ThrottleEngine::preview`);
/// it never mutates and never consults storage.
pub struct StatusProjector;

impl StatusProjector {
    pub fn project(record: &AttemptRecord, now: DateTime<Utc>, policy: &ThrottlePolicy) -> StatusView {
        let state = record.state_at(now);
        let attempts = record.attempt_count;

        match state {
            IdentifierState::AdminBlocked => StatusView {
                attempts,
                is_locked: true,
                remaining_attempts: 0,
                lock_until: None,
                remaining_time: None,
                state,
            },
            IdentifierState::Locked => {
                let lock_until = record.locked_until;
                StatusView {
                    attempts,
                    is_locked: true,
                    remaining_attempts: 0,
                    lock_until,
                    remaining_time: lock_until.map(|until| ceil_seconds(until - now)),
                    state,
                }
            }
            IdentifierState::Unlocked => StatusView {
                attempts,
                is_locked: false,
                remaining_attempts: policy.max_attempts_per_window().saturating_sub(attempts),
                lock_until: None,
                remaining_time: None,
                state,
            },
        }
    }
}
