//! Pure vote-ledger mutations.
//!
//! A ledger holds at most one vote per voter. Every mutation recomputes the
//! cached score from the full ledger; nothing here increments totals in
//! place, which is what keeps the score drift-free under the engine's
//! reload-and-retry concurrency scheme.

use vouch_store::TargetRecord;
use vouch_types::{Address, Score, Vote};

/// Insert `vote` into the record's ledger, replacing the voter's existing
/// slot if present, then recompute the score.
pub fn apply_vote(record: &mut TargetRecord, vote: Vote) {
    match record.votes.iter_mut().find(|v| v.voter == vote.voter) {
        Some(slot) => *slot = vote,
        None => record.votes.push(vote),
    }
    record.score = Score::from_ledger(&record.votes);
}

/// Remove the voter's slot entirely (not set-to-zero) and recompute.
/// Returns whether a vote was actually removed.
pub fn remove_vote(record: &mut TargetRecord, voter: &Address) -> bool {
    let before = record.votes.len();
    record.votes.retain(|v| &v.voter != voter);
    let removed = record.votes.len() != before;
    if removed {
        record.score = Score::from_ledger(&record.votes);
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use vouch_store::TargetState;
    use vouch_types::{Timestamp, VoteDirection};

    fn addr(seed: u8) -> Address {
        Address::parse(&format!("0x{:040x}", seed)).unwrap()
    }

    fn vote(seed: u8, weight: u32, direction: VoteDirection) -> Vote {
        Vote::new(addr(seed), weight, direction, Timestamp::new(1000))
    }

    fn active_record() -> TargetRecord {
        let mut record = TargetRecord::pending("alice");
        record.state = TargetState::Active;
        record
    }

    #[test]
    fn first_vote_appends_and_scores() {
        let mut record = active_record();
        apply_vote(&mut record, vote(1, 7, VoteDirection::Up));
        assert_eq!(record.votes.len(), 1);
        assert_eq!(record.score, Score { up: 7, down: 0 });
    }

    #[test]
    fn revote_replaces_slot_not_accumulates() {
        let mut record = active_record();
        apply_vote(&mut record, vote(1, 7, VoteDirection::Up));
        apply_vote(&mut record, vote(1, 7, VoteDirection::Down));

        // One slot, flipped: never up=7,down=7.
        assert_eq!(record.votes.len(), 1);
        assert_eq!(record.score, Score { up: 0, down: 7 });
    }

    #[test]
    fn revote_with_new_weight_updates_slot() {
        let mut record = active_record();
        apply_vote(&mut record, vote(1, 7, VoteDirection::Up));
        apply_vote(&mut record, vote(1, 10, VoteDirection::Up));
        assert_eq!(record.votes.len(), 1);
        assert_eq!(record.score, Score { up: 10, down: 0 });
    }

    #[test]
    fn distinct_voters_get_distinct_slots() {
        let mut record = active_record();
        apply_vote(&mut record, vote(1, 7, VoteDirection::Up));
        apply_vote(&mut record, vote(2, 3, VoteDirection::Up));
        apply_vote(&mut record, vote(3, 5, VoteDirection::Down));
        assert_eq!(record.votes.len(), 3);
        assert_eq!(record.score, Score { up: 10, down: 5 });
    }

    #[test]
    fn remove_vote_drops_influence() {
        let mut record = active_record();
        apply_vote(&mut record, vote(1, 7, VoteDirection::Up));
        apply_vote(&mut record, vote(2, 3, VoteDirection::Up));

        assert!(remove_vote(&mut record, &addr(1)));
        assert_eq!(record.votes.len(), 1);
        assert_eq!(record.score, Score { up: 3, down: 0 });
    }

    #[test]
    fn remove_missing_vote_is_noop() {
        let mut record = active_record();
        apply_vote(&mut record, vote(1, 7, VoteDirection::Up));

        assert!(!remove_vote(&mut record, &addr(9)));
        assert_eq!(record.score, Score { up: 7, down: 0 });
    }
}
