// crates/stakewatch-core/src/ranking.rs
//
// Top-N staker selection by locked balance.
//
// Ordering is descending by `locked_balance`; equal balances keep their
// input order (`sort_by` is stable), so the same input always ranks the
// same way and ranking an already ranked snapshot is a no-op.

use crate::staker::{StakerRecord, StakerSnapshot};

/// Number of stakers relayed to the destination chain each epoch.
pub const TOP_STAKERS: usize = 20;

/// Select the `n` records with the greatest locked balance.
pub fn rank_top(records: &[StakerRecord], n: usize) -> StakerSnapshot {
    let mut ranked = records.to_vec();
    ranked.sort_by(|a, b| b.locked_balance.cmp(&a.locked_balance));
    ranked.truncate(n);
    ranked
}

/// Select the top [`TOP_STAKERS`] records.
pub fn rank_top20(records: &[StakerRecord]) -> StakerSnapshot {
    rank_top(records, TOP_STAKERS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::Address;

    fn staker(tag: u8, balance: u128) -> StakerRecord {
        StakerRecord::new(Address::from_bytes([tag; 20]), balance)
    }

    #[test]
    fn empty_input_ranks_empty() {
        assert!(rank_top20(&[]).is_empty());
    }

    #[test]
    fn short_input_keeps_everything_sorted() {
        let ranked = rank_top20(&[staker(1, 10), staker(2, 30), staker(3, 20)]);
        let balances: Vec<u128> = ranked.iter().map(|r| r.locked_balance).collect();
        assert_eq!(balances, vec![30, 20, 10]);
    }

    #[test]
    fn truncates_to_twenty() {
        let input: Vec<StakerRecord> = (0..50u8).map(|i| staker(i, i as u128)).collect();
        let ranked = rank_top20(&input);
        assert_eq!(ranked.len(), TOP_STAKERS);
        assert_eq!(ranked[0].locked_balance, 49);
        assert_eq!(ranked[19].locked_balance, 30);
    }

    #[test]
    fn ties_keep_enumeration_order() {
        let input = vec![staker(1, 5), staker(2, 9), staker(3, 5), staker(4, 5)];
        let ranked = rank_top(&input, 3);
        let tags: Vec<u8> = ranked.iter().map(|r| r.work_base().as_bytes()[0]).collect();
        assert_eq!(tags, vec![2, 1, 3]);
    }

    #[test]
    fn ranking_is_idempotent() {
        let input: Vec<StakerRecord> = (0..40u8)
            .map(|i| staker(i, ((i as u128) * 7919) % 13))
            .collect();
        let once = rank_top20(&input);
        let twice = rank_top20(&once);
        assert_eq!(once, twice);
        assert!(once
            .windows(2)
            .all(|w| w[0].locked_balance >= w[1].locked_balance));
    }
}
