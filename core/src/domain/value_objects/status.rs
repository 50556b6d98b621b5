//! Client-safe status payload for polling endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::IdentifierState;

/// Read-only status of an identifier, safe to show to the end user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusView {
    /// Attempts counted in the current window
    pub attempts: u32,
    /// True for a temporary lock or an admin block
    pub is_locked: bool,
    /// Requests still allowed in this window (0 while locked)
    pub remaining_attempts: u32,
    /// End of the temporary lock; `None` when unlocked or admin-blocked
    pub lock_until: Option<DateTime<Utc>>,
    /// Whole seconds until `lock_until`
    pub remaining_time: Option<i64>,
    pub state: IdentifierState,
}
