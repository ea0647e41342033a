//! Check-in decision logic.
//!
//! The policy is pure: it takes the member's current state and a wall-clock
//! instant, and either rejects with the remaining cooldown or returns the
//! full set of fields to persist. The caller supplies `now` and must stamp
//! the attendance record with the same instant, so the gate check and the
//! persisted time come from one clock.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CheckInError;
use crate::member::{month_key, Member};
use crate::progression::{evaluate_promotion, Belt};

/// Minimum interval between two accepted check-ins for the same member.
pub const DEFAULT_COOLDOWN_HOURS: i64 = 6;

/// Gate for a single check-in event.
#[derive(Debug, Clone)]
pub struct CheckInPolicy {
    cooldown: Duration,
}

impl Default for CheckInPolicy {
    fn default() -> Self {
        Self {
            cooldown: Duration::hours(DEFAULT_COOLDOWN_HOURS),
        }
    }
}

impl CheckInPolicy {
    /// Policy with the default 6-hour cooldown.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cooldown(cooldown: Duration) -> Self {
        Self { cooldown }
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Gate and compute a check-in for `member` at `now`.
    ///
    /// Rejection leaves every field untouched. Acceptance returns the
    /// post-check-in member fields plus exactly one outcome.
    ///
    /// # Errors
    /// Returns `CooldownActive` with the remaining wait when `now` is within
    /// the cooldown window of the member's previous accepted check-in.
    pub fn evaluate(
        &self,
        member: &Member,
        now: DateTime<Utc>,
    ) -> Result<CheckInUpdate, CheckInError> {
        if let Some(last) = member.last_check_in {
            let elapsed = now - last;
            if elapsed < self.cooldown {
                return Err(CheckInError::CooldownActive {
                    remaining: self.cooldown - elapsed,
                });
            }
        }

        let new_lifetime = member.lifetime_training_count + 1;
        let key = month_key(now);
        let monthly_count = member.monthly_count(&key) + 1;

        let promotion = evaluate_promotion(member.belt, new_lifetime);
        let (belt, lifetime, outcome) = if promotion.promoted {
            // The reset and the belt change land in the same update.
            (
                promotion.next_belt,
                0,
                CheckInOutcome::Promoted {
                    to: promotion.next_belt,
                },
            )
        } else if let Some(tier) = promotion.completed_tier {
            (member.belt, new_lifetime, CheckInOutcome::TierCompleted { tier })
        } else {
            (member.belt, new_lifetime, CheckInOutcome::Recorded)
        };

        Ok(CheckInUpdate {
            belt,
            lifetime_training_count: lifetime,
            month_key: key,
            monthly_count,
            last_check_in: now,
            outcome,
        })
    }
}

/// Member fields after an accepted check-in, plus the reported outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckInUpdate {
    pub belt: Belt,
    pub lifetime_training_count: u32,
    pub month_key: String,
    pub monthly_count: u32,
    pub last_check_in: DateTime<Utc>,
    pub outcome: CheckInOutcome,
}

/// Exactly one outcome per accepted check-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum CheckInOutcome {
    /// Counters advanced; no boundary crossed.
    Recorded,
    /// A Dan tier boundary was crossed without finishing the belt.
    TierCompleted { tier: u8 },
    /// The belt was completed; the member now holds `to`.
    Promoted { to: Belt },
}
