use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::progression::Belt;

/// Every accepted check-in produces exactly one Event.
/// Frontends poll for events; dashboards subscribe to them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// Plain accepted check-in: counters advanced, nothing else happened.
    CheckInRecorded {
        member_id: Uuid,
        belt: Belt,
        lifetime_training_count: u32,
        month_key: String,
        monthly_count: u32,
        at: DateTime<Utc>,
    },
    /// The check-in landed exactly on a Dan tier boundary.
    TierCompleted {
        member_id: Uuid,
        belt: Belt,
        tier: u8,
        at: DateTime<Utc>,
    },
    /// The check-in completed the belt; the lifetime counter was reset.
    MemberPromoted {
        member_id: Uuid,
        from_belt: Belt,
        to_belt: Belt,
        at: DateTime<Utc>,
    },
}
