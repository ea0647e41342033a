//! The member aggregate.
//!
//! A member's counters (`lifetime_training_count`, `monthly_training_count`)
//! and belt are owned exclusively by the check-in path; no other writer
//! mutates them. The monthly map is keyed by `"YYYY-MM"` and its entries
//! never decrease and are never reset. The lifetime count resets to 0 only
//! at the instant of a promotion, in the same update.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::progression::{Belt, RankProgress};

/// Calendar-month key used to partition monthly counters.
pub fn month_key(at: DateTime<Utc>) -> String {
    at.format("%Y-%m").to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: Uuid,
    pub name: String,
    pub belt: Belt,
    /// Cumulative accepted check-ins since the last promotion.
    pub lifetime_training_count: u32,
    /// Accepted check-ins per calendar month, keyed `"YYYY-MM"`.
    pub monthly_training_count: BTreeMap<String, u32>,
    pub last_check_in: Option<DateTime<Utc>>,
    pub joined_at: DateTime<Utc>,
}

impl Member {
    /// A fresh white-belt member with zeroed counters.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            belt: Belt::White,
            lifetime_training_count: 0,
            monthly_training_count: BTreeMap::new(),
            last_check_in: None,
            joined_at: Utc::now(),
        }
    }

    /// Accepted check-ins for the given `"YYYY-MM"` month, 0 if none.
    pub fn monthly_count(&self, key: &str) -> u32 {
        self.monthly_training_count.get(key).copied().unwrap_or(0)
    }

    /// Read-only progression snapshot for display.
    pub fn progress(&self) -> RankProgress {
        RankProgress::compute(self.belt, self.lifetime_training_count)
    }
}
