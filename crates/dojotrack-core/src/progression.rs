//! Belt progression math.
//!
//! Everything in this module is a pure derivation from `(belt, lifetime
//! training count)` -- no side effects, no I/O. The check-in service calls
//! [`evaluate_promotion`] when applying an accepted check-in; progress
//! screens call [`RankProgress::compute`] read-only.
//!
//! ## Rank state machine
//!
//! ```text
//! white -> blue -> purple -> brown -> black
//! ```
//!
//! Each belt spans four Dan tiers. A tier is 40 trainings on white and 60 on
//! every later belt, so a full belt takes 160 (white) or 240 trainings.
//! Black is absorbing: its counter keeps cycling but the belt never changes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Number of Dan tiers per belt.
pub const TIERS_PER_BELT: u8 = 4;

/// Belt rank, ordered. Never regresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Belt {
    White,
    Blue,
    Purple,
    Brown,
    Black,
}

/// Unknown belt name encountered while parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown belt '{0}'")]
pub struct ParseBeltError(pub String);

impl Belt {
    /// All belts in progression order.
    pub const ALL: [Belt; 5] = [
        Belt::White,
        Belt::Blue,
        Belt::Purple,
        Belt::Brown,
        Belt::Black,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Belt::White => "white",
            Belt::Blue => "blue",
            Belt::Purple => "purple",
            Belt::Brown => "brown",
            Belt::Black => "black",
        }
    }

    /// The next belt in the progression. Black is terminal.
    pub fn successor(self) -> Belt {
        match self {
            Belt::White => Belt::Blue,
            Belt::Blue => Belt::Purple,
            Belt::Purple => Belt::Brown,
            Belt::Brown => Belt::Black,
            Belt::Black => Belt::Black,
        }
    }

    /// Trainings per Dan tier on this belt.
    pub fn tier_size(self) -> u32 {
        match self {
            Belt::White => 40,
            _ => 60,
        }
    }

    /// Lifetime count at which this belt is complete and a promotion fires.
    pub fn required_total(self) -> u32 {
        u32::from(TIERS_PER_BELT) * self.tier_size()
    }
}

impl fmt::Display for Belt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Belt {
    type Err = ParseBeltError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "white" => Ok(Belt::White),
            "blue" => Ok(Belt::Blue),
            "purple" => Ok(Belt::Purple),
            "brown" => Ok(Belt::Brown),
            "black" => Ok(Belt::Black),
            other => Err(ParseBeltError(other.to_string())),
        }
    }
}

/// Current Dan tier for a lifetime count, 1-based and capped at 4.
///
/// A count large enough to exceed tier 4's span would already have triggered
/// a promotion, so the cap only matters for the transient pre-reset value.
pub fn current_tier(belt: Belt, count: u32) -> u8 {
    ((count / belt.tier_size()) + 1).min(u32::from(TIERS_PER_BELT)) as u8
}

/// Count shown within the current tier.
///
/// An exact positive multiple of the tier size displays as a full tier
/// (`tier_size`), not as an empty next tier. This drives both the progress
/// bar and the trainings-remaining figure at every tier boundary.
pub fn count_within_tier(belt: Belt, count: u32) -> u32 {
    let size = belt.tier_size();
    let rem = count % size;
    if rem == 0 && count > 0 {
        size
    } else {
        rem
    }
}

/// Outcome of evaluating a lifetime count against the promotion rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Promotion {
    /// Whether the count reached the belt's required total.
    pub promoted: bool,
    /// The belt after evaluation; unchanged unless `promoted`.
    pub next_belt: Belt,
    /// Set only when the count lands exactly on a tier boundary without
    /// reaching the required total: the 1-based tier just completed.
    pub completed_tier: Option<u8>,
}

/// Evaluate whether `count` promotes out of `belt` or completes a tier.
pub fn evaluate_promotion(belt: Belt, count: u32) -> Promotion {
    let promoted = count >= belt.required_total();
    let next_belt = if promoted { belt.successor() } else { belt };

    let size = belt.tier_size();
    let completed_tier = if !promoted && count > 0 && count % size == 0 {
        Some((count / size) as u8)
    } else {
        None
    };

    Promotion {
        promoted,
        next_belt,
        completed_tier,
    }
}

/// Read-only progression snapshot for display frontends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankProgress {
    pub belt: Belt,
    /// Current Dan tier, 1-4.
    pub tier: u8,
    pub tier_size: u32,
    /// Trainings counted toward the current tier (full tier at a boundary).
    pub within_tier: u32,
    /// Trainings left to finish the current tier.
    pub remaining_in_tier: u32,
    pub required_total: u32,
    /// Trainings left until the next belt.
    pub remaining_to_promotion: u32,
}

impl RankProgress {
    pub fn compute(belt: Belt, count: u32) -> Self {
        let within = count_within_tier(belt, count);
        RankProgress {
            belt,
            tier: current_tier(belt, count),
            tier_size: belt.tier_size(),
            within_tier: within,
            remaining_in_tier: belt.tier_size() - within,
            required_total: belt.required_total(),
            remaining_to_promotion: belt.required_total().saturating_sub(count),
        }
    }
}
