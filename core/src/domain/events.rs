//! State-change notifications for the operator dashboard.
//!
//! The engine only emits; transport to the dashboard (websocket, SSE) is owned
//! by whoever subscribes to the broadcast channel.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

use crate::domain::value_objects::{DenyReason, Identifier};

/// What changed for an identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ThrottleEventKind {
    AttemptAllowed { remaining_attempts: u32 },
    AttemptDenied { reason: DenyReason },
    LockEngaged { locked_until: DateTime<Utc> },
    LockExpired,
    Blocked,
    Unblocked,
    Reset,
    ResendTriggered,
    Purged,
}

/// A single state-change notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThrottleEvent {
    pub identifier: Identifier,
    pub kind: ThrottleEventKind,
    pub occurred_at: DateTime<Utc>,
}

impl ThrottleEvent {
    pub fn new(identifier: Identifier, kind: ThrottleEventKind, occurred_at: DateTime<Utc>) -> Self {
        Self {
            identifier,
            kind,
            occurred_at,
        }
    }
}

/// Publisher that fans events out over a tokio broadcast channel
#[derive(Clone)]
pub struct ThrottleEventPublisher {
    sender: broadcast::Sender<ThrottleEvent>,
}

impl ThrottleEventPublisher {
    /// Create a publisher with the given channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Fire-and-forget; a missing subscriber is not an error
    pub fn publish(&self, event: ThrottleEvent) {
        if let Err(e) = self.sender.send(event) {
            debug!(
                identifier = %e.0.identifier.masked(),
                "No dashboard subscribers for throttle event"
            );
        }
    }

    /// Get a new receiver for the broadcast channel
    pub fn subscribe(&self) -> broadcast::Receiver<ThrottleEvent> {
        self.sender.subscribe()
    }
}

impl Default for ThrottleEventPublisher {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribers_receive_published_events() {
        let publisher = ThrottleEventPublisher::new(8);
        let mut rx = publisher.subscribe();
        let id = Identifier::parse("+15550100").unwrap();

        publisher.publish(ThrottleEvent::new(id.clone(), ThrottleEventKind::Blocked, Utc::now()));

        let event = rx.recv().await.unwrap();
        assert_eq!(event.identifier, id);
        assert_eq!(event.kind, ThrottleEventKind::Blocked);
    }

    #[test]
    fn test_publish_without_subscribers_is_silent() {
        let publisher = ThrottleEventPublisher::new(1);
        let id = Identifier::parse("+15550100").unwrap();
        publisher.publish(ThrottleEvent::new(id, ThrottleEventKind::Reset, Utc::now()));
    }

    #[test]
    fn test_event_kind_serializes_with_tag() {
        let json = serde_json::to_value(ThrottleEventKind::AttemptDenied {
            reason: DenyReason::Cooldown,
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({ "type": "attempt_denied", "reason": "cooldown" }));
    }
}
