//! Weighted votes cast by wallet holders.

use crate::{Address, Timestamp};
use serde::{Deserialize, Serialize};

/// Which way a vote points.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoteDirection {
    Up,
    Down,
}

/// A single weighted vote on a target.
///
/// A target's ledger holds at most one `Vote` per voter; a later vote by
/// the same wallet replaces the earlier one in place rather than appending.
/// The weight is captured at cast time and only changes when the voter
/// re-votes or is revoked.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    /// The wallet that cast this vote.
    pub voter: Address,
    /// Influence derived from the voter's highest-ranked qualifying collection.
    pub weight: u32,
    pub direction: VoteDirection,
    /// When this vote was cast or last replaced.
    pub cast_at: Timestamp,
}

impl Vote {
    pub fn new(voter: Address, weight: u32, direction: VoteDirection, cast_at: Timestamp) -> Self {
        Self {
            voter,
            weight,
            direction,
            cast_at,
        }
    }
}
