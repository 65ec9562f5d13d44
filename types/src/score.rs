//! Aggregated vote score and the status tier derived from it.

use crate::{Vote, VoteDirection};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Approval rate at or above which a target is `Approved`.
pub const APPROVED_THRESHOLD: u8 = 70;

/// Approval rate at or above which a target is `Moderate`.
pub const MODERATE_THRESHOLD: u8 = 40;

/// Aggregated up/down weight totals for a target.
///
/// Always exactly the weight-sum of the current vote ledger: every mutation
/// path recomputes from the full ledger via [`Score::from_ledger`], never
/// increments or decrements heuristically. This is what keeps the cached
/// score drift-free under concurrent interleavings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    /// Sum of weights of `Up` votes.
    pub up: u64,
    /// Sum of weights of `Down` votes.
    pub down: u64,
}

/// Community approval tier, derived from the score. Never stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Approved,
    Moderate,
    Risk,
}

impl Score {
    pub const ZERO: Self = Self { up: 0, down: 0 };

    /// Recompute the score from a vote ledger.
    pub fn from_ledger(votes: &[Vote]) -> Self {
        let mut score = Self::ZERO;
        for vote in votes {
            match vote.direction {
                VoteDirection::Up => score.up += u64::from(vote.weight),
                VoteDirection::Down => score.down += u64::from(vote.weight),
            }
        }
        score
    }

    /// Total voted weight.
    pub fn total(&self) -> u64 {
        self.up + self.down
    }

    /// Approval rate as an integer percentage in `0..=100`.
    ///
    /// Defined as 0 when no votes exist, guarding the division.
    pub fn approval_rate(&self) -> u8 {
        let total = self.total();
        if total == 0 {
            return 0;
        }
        // u128 intermediate so 100·up cannot overflow.
        (100u128 * u128::from(self.up) / u128::from(total)) as u8
    }

    /// Classify this score into a status tier.
    ///
    /// Note that a never-voted target classifies as `Risk` (rate defined
    /// as 0); presentation layers may want to special-case the empty ledger.
    pub fn classify(&self) -> Status {
        let rate = self.approval_rate();
        if rate >= APPROVED_THRESHOLD {
            Status::Approved
        } else if rate >= MODERATE_THRESHOLD {
            Status::Moderate
        } else {
            Status::Risk
        }
    }

    /// Advisory gold-badge rule: over 90% approval on more than 100 total
    /// voted weight. Consumed by the presentation layer only.
    pub fn is_gold_badge_eligible(&self) -> bool {
        self.approval_rate() > 90 && self.total() > 100
    }
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Approved => "Approved",
            Status::Moderate => "Moderate",
            Status::Risk => "Risk",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Address, Timestamp};

    fn test_address(seed: u8) -> Address {
        Address::parse(&format!("0x{:040x}", seed)).unwrap()
    }

    fn vote(seed: u8, weight: u32, direction: VoteDirection) -> Vote {
        Vote::new(test_address(seed), weight, direction, Timestamp::new(1000))
    }

    #[test]
    fn empty_ledger_scores_zero() {
        let score = Score::from_ledger(&[]);
        assert_eq!(score, Score::ZERO);
        assert_eq!(score.approval_rate(), 0);
        assert_eq!(score.classify(), Status::Risk);
    }

    #[test]
    fn from_ledger_sums_weights_by_direction() {
        let votes = vec![
            vote(1, 7, VoteDirection::Up),
            vote(2, 3, VoteDirection::Up),
            vote(3, 5, VoteDirection::Down),
        ];
        let score = Score::from_ledger(&votes);
        assert_eq!(score, Score { up: 10, down: 5 });
    }

    #[test]
    fn rate_exactly_70_is_approved() {
        let score = Score { up: 70, down: 30 };
        assert_eq!(score.approval_rate(), 70);
        assert_eq!(score.classify(), Status::Approved);
    }

    #[test]
    fn rate_69_is_moderate() {
        let score = Score { up: 69, down: 31 };
        assert_eq!(score.approval_rate(), 69);
        assert_eq!(score.classify(), Status::Moderate);
    }

    #[test]
    fn rate_39_is_risk() {
        let score = Score { up: 39, down: 61 };
        assert_eq!(score.classify(), Status::Risk);
    }

    #[test]
    fn gold_badge_needs_rate_and_volume() {
        // 95% on 200 total: eligible.
        assert!(Score { up: 190, down: 10 }.is_gold_badge_eligible());
        // 95% but only 20 total: not enough volume.
        assert!(!Score { up: 19, down: 1 }.is_gold_badge_eligible());
        // Exactly 90% is not "over 90".
        assert!(!Score { up: 180, down: 20 }.is_gold_badge_eligible());
    }
}
