// crates/stakewatch-daemon/src/mock.rs
//
// Seeded mock chains for `--mock` runs: a self-advancing source chain with
// a small staker registry and scattered deposits, so every epoch has
// something to rank, diff, and submit without any network access.

use stakewatch_core::Address;
use stakewatch_rpc::{deposit_log, MockSourceChain};

/// Stakers in the seeded registry (more than the ranked top so some are
/// cut off).
const MOCK_STAKERS: u8 = 24;

/// Blocks between seeded deposits.
const DEPOSIT_SPACING: u64 = 37;

/// Deposits seeded ahead of the start block.
const MOCK_DEPOSITS: u64 = 64;

fn mock_staker(index: u8) -> Address {
    let mut bytes = [0u8; 20];
    bytes[0] = 0x5a;
    bytes[19] = index;
    Address::from_bytes(bytes)
}

/// Build a source chain whose head starts `confirmations` blocks past
/// `start` and grows by one block per head read.
pub async fn seeded_source(start: u64, confirmations: u64, topic: [u8; 32]) -> MockSourceChain {
    let chain = MockSourceChain::new(start.saturating_add(confirmations));
    chain.set_auto_advance(true).await;

    for i in 0..MOCK_STAKERS {
        let balance = 1_000u128 + (i as u128 * 7_919) % 5_000;
        chain.add_staker(mock_staker(i), balance).await;
    }

    for n in 0..MOCK_DEPOSITS {
        let height = start.saturating_add(n * DEPOSIT_SPACING);
        let staker = mock_staker((n % MOCK_STAKERS as u64) as u8);
        chain
            .push_log(deposit_log(topic, height, staker, 100 + n * 10, 4 + n % 12))
            .await;
    }

    tracing::info!(
        "Mock source chain seeded with {} stakers and {} deposits from block {}",
        MOCK_STAKERS,
        MOCK_DEPOSITS,
        start
    );
    chain
}

#[cfg(test)]
mod tests {
    use super::*;
    use stakewatch_core::{LogFilter, SourceChain};

    #[tokio::test]
    async fn seeded_chain_is_confirmed_from_start() {
        let chain = seeded_source(100, 5, [7; 32]).await;
        assert_eq!(chain.latest_block().await.unwrap(), 105);
        assert_eq!(chain.latest_block().await.unwrap(), 106);
        assert_eq!(chain.stakers_length().await.unwrap(), MOCK_STAKERS as u64);

        let logs = chain
            .filter_logs(&LogFilter::single_block(Address::default(), [7; 32], 100))
            .await
            .unwrap();
        assert_eq!(logs.len(), 1);
    }
}
