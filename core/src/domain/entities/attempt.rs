//! Attempt record entity: per-identifier OTP request history and lock state.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::Identifier;

/// Default number of events kept in `AttemptRecord::history`
pub const DEFAULT_HISTORY_CAPACITY: usize = 20;

/// How an attempt event entered the record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AttemptKind {
    /// First counted request of a window
    Initial,
    /// Subsequent counted request inside the same window
    Resend,
    /// Operator resend, bypasses throttling and is not counted
    AdminTriggered,
}

impl AttemptKind {
    /// Whether the event counts against the window limit
    pub fn is_counted(&self) -> bool {
        !matches!(self, AttemptKind::AdminTriggered)
    }
}

/// Request context supplied by the web layer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestMetadata {
    pub source_ip: Option<String>,
    pub user_agent: Option<String>,
}

impl RequestMetadata {
    pub fn new(source_ip: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            source_ip: Some(source_ip.into()),
            user_agent: Some(user_agent.into()),
        }
    }
}

/// Single entry of an identifier's attempt history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptEvent {
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "sourceIP")]
    pub source_ip: Option<String>,
    pub user_agent: Option<String>,
    pub kind: AttemptKind,
}

impl AttemptEvent {
    pub fn new(timestamp: DateTime<Utc>, kind: AttemptKind, metadata: &RequestMetadata) -> Self {
        Self {
            timestamp,
            source_ip: metadata.source_ip.clone(),
            user_agent: metadata.user_agent.clone(),
            kind,
        }
    }
}

/// Externally visible state of an identifier at an instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierState {
    Unlocked,
    Locked,
    AdminBlocked,
}

/// Durable attempt state for one identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptRecord {
    pub identifier: Identifier,
    pub attempt_count: u32,
    pub window_started_at: Option<DateTime<Utc>>,
    pub last_attempt_at: Option<DateTime<Utc>>,
    pub locked_until: Option<DateTime<Utc>>,
    #[serde(default)]
    pub history: VecDeque<AttemptEvent>,
    #[serde(default)]
    pub admin_blocked: bool,
}

impl AttemptRecord {
    /// Fresh record for an identifier that has never been seen
    pub fn new(identifier: Identifier) -> Self {
        Self {
            identifier,
            attempt_count: 0,
            window_started_at: None,
            last_attempt_at: None,
            locked_until: None,
            history: VecDeque::new(),
            admin_blocked: false,
        }
    }

    /// True while a temporary lock is in force (ignores the admin block)
    pub fn is_locked_at(&self, now: DateTime<Utc>) -> bool {
        self.locked_until.map_or(false, |until| now < until)
    }

    /// Admin block dominates the temporary lock
    pub fn state_at(&self, now: DateTime<Utc>) -> IdentifierState {
        if self.admin_blocked {
            IdentifierState::AdminBlocked
        } else if self.is_locked_at(now) {
            IdentifierState::Locked
        } else {
            IdentifierState::Unlocked
        }
    }

    /// Append an event, evicting the oldest entries beyond `capacity`
    pub fn push_event(&mut self, event: AttemptEvent, capacity: usize) {
        self.history.push_back(event);
        while self.history.len() > capacity {
            self.history.pop_front();
        }
    }

    /// Clear counters and lock, keeping history and the admin block
    pub fn clear_counters(&mut self) {
        self.attempt_count = 0;
        self.window_started_at = None;
        self.locked_until = None;
    }

    /// Counted events recorded since the current window opened
    pub fn counted_in_window(&self) -> usize {
        let Some(started) = self.window_started_at else {
            return 0;
        };
        self.history
            .iter()
            .filter(|event| event.kind.is_counted() && event.timestamp >= started)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn record() -> AttemptRecord {
        AttemptRecord::new(Identifier::parse("+15550100").unwrap())
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn test_new_record_is_fresh() {
        let record = record();
        assert_eq!(record.attempt_count, 0);
        assert!(record.history.is_empty());
        assert_eq!(record.state_at(at(0)), IdentifierState::Unlocked);
    }

    #[test]
    fn test_admin_block_dominates_lock() {
        let mut record = record();
        record.locked_until = Some(at(600));
        assert_eq!(record.state_at(at(10)), IdentifierState::Locked);

        record.admin_blocked = true;
        assert_eq!(record.state_at(at(10)), IdentifierState::AdminBlocked);
        assert_eq!(record.state_at(at(10_000)), IdentifierState::AdminBlocked);
    }

    #[test]
    fn test_lock_ends_exactly_at_locked_until() {
        let mut record = record();
        record.locked_until = Some(at(600));
        assert!(record.is_locked_at(at(599)));
        assert!(!record.is_locked_at(at(600)));
    }

    #[test]
    fn test_history_is_capped_oldest_first() {
        let mut record = record();
        let meta = RequestMetadata::default();
        for i in 0..5 {
            record.push_event(AttemptEvent::new(at(i), AttemptKind::Resend, &meta), 3);
        }
        assert_eq!(record.history.len(), 3);
        assert_eq!(record.history.front().unwrap().timestamp, at(2));
        assert_eq!(record.history.back().unwrap().timestamp, at(4));
    }

    #[test]
    fn test_counted_in_window_skips_admin_events() {
        let mut record = record();
        let meta = RequestMetadata::default();
        record.window_started_at = Some(at(100));
        record.push_event(AttemptEvent::new(at(50), AttemptKind::Initial, &meta), 20);
        record.push_event(AttemptEvent::new(at(100), AttemptKind::Initial, &meta), 20);
        record.push_event(AttemptEvent::new(at(110), AttemptKind::AdminTriggered, &meta), 20);
        record.push_event(AttemptEvent::new(at(120), AttemptKind::Resend, &meta), 20);
        assert_eq!(record.counted_in_window(), 2);
    }

    #[test]
    fn test_clear_counters_keeps_history_and_block() {
        let mut record = record();
        record.attempt_count = 3;
        record.window_started_at = Some(at(0));
        record.locked_until = Some(at(0) + Duration::minutes(10));
        record.admin_blocked = true;
        record.push_event(
            AttemptEvent::new(at(0), AttemptKind::Initial, &RequestMetadata::default()),
            20,
        );

        record.clear_counters();

        assert_eq!(record.attempt_count, 0);
        assert!(record.window_started_at.is_none());
        assert!(record.locked_until.is_none());
        assert!(record.admin_blocked);
        assert_eq!(record.history.len(), 1);
    }

    #[test]
    fn test_record_json_uses_camel_case() {
        let mut record = record();
        record.push_event(
            AttemptEvent::new(at(0), AttemptKind::AdminTriggered, &RequestMetadata::new("10.0.0.1", "curl")),
            20,
        );
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["identifier"], "+15550100");
        assert_eq!(json["attemptCount"], 0);
        assert_eq!(json["adminBlocked"], false);
        assert_eq!(json["history"][0]["kind"], "admin-triggered");
        assert_eq!(json["history"][0]["sourceIP"], "10.0.0.1");
    }
}
