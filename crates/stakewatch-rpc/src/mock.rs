// crates/stakewatch-rpc/src/mock.rs
//
// Scripted in-memory chains.
//
// `MockSourceChain` serves a configurable head height, per-block logs, and a
// staker registry, with injectable failures for each call. `MockDestination`
// records every submitted payload and can be told to reject submissions.
// Both back the integration tests and the daemon's `--mock` mode.

use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use ethers::abi::{encode, Token};
use ethers::types::U256;
use tokio::sync::Mutex;

use stakewatch_core::{
    Address, DestinationChain, LogFilter, RawLog, SourceChain, StakerInfo, StakerRecord,
    WatcherError,
};

/// Build a deposit log in the layout emitted by the staking contract:
/// `topics = [event_topic, staker]`, `data = value ++ periods`.
pub fn deposit_log(topic: [u8; 32], height: u64, staker: Address, value: u64, periods: u64) -> RawLog {
    RawLog {
        block_number: height,
        topics: vec![topic, staker.to_word()],
        data: encode(&[Token::Uint(U256::from(value)), Token::Uint(U256::from(periods))]),
    }
}

#[derive(Debug, Default)]
struct SourceState {
    latest: u64,
    /// Advance the head by one block after every successful height read.
    auto_advance: bool,
    latest_failures: u32,
    log_failures: u32,
    length_failures: u32,
    logs: BTreeMap<u64, Vec<RawLog>>,
    registry: Vec<(Address, u128)>,
    broken_indices: HashSet<u64>,
    latest_calls: u32,
    log_queries: Vec<u64>,
}

/// Scripted source chain.
#[derive(Debug, Default)]
pub struct MockSourceChain {
    state: Mutex<SourceState>,
}

impl MockSourceChain {
    /// Create a chain whose head is at `latest`.
    pub fn new(latest: u64) -> Self {
        Self {
            state: Mutex::new(SourceState {
                latest,
                ..SourceState::default()
            }),
        }
    }

    pub async fn set_latest(&self, latest: u64) {
        self.state.lock().await.latest = latest;
    }

    /// Grow the chain by one block after every head read.
    pub async fn set_auto_advance(&self, enabled: bool) {
        self.state.lock().await.auto_advance = enabled;
    }

    /// Fail the next `n` head reads with a network error.
    pub async fn fail_next_latest(&self, n: u32) {
        self.state.lock().await.latest_failures = n;
    }

    /// Fail the next `n` log queries with a network error.
    pub async fn fail_next_log_queries(&self, n: u32) {
        self.state.lock().await.log_failures = n;
    }

    /// Fail the next `n` registry length reads with a network error.
    pub async fn fail_next_length_reads(&self, n: u32) {
        self.state.lock().await.length_failures = n;
    }

    pub async fn push_log(&self, log: RawLog) {
        self.state
            .lock()
            .await
            .logs
            .entry(log.block_number)
            .or_default()
            .push(log);
    }

    /// Append a staker to the registry.
    pub async fn add_staker(&self, staker: Address, value: u128) {
        self.state.lock().await.registry.push((staker, value));
    }

    /// Remove every registry entry for `staker`.
    pub async fn remove_staker(&self, staker: &Address) {
        self.state
            .lock()
            .await
            .registry
            .retain(|(addr, _)| addr != staker);
    }

    /// Make `staker_at(index)` fail.
    pub async fn break_index(&self, index: u64) {
        self.state.lock().await.broken_indices.insert(index);
    }

    /// Number of head reads served (including failures).
    pub async fn latest_calls(&self) -> u32 {
        self.state.lock().await.latest_calls
    }

    /// `from_block` of every log query served, in order.
    pub async fn log_queries(&self) -> Vec<u64> {
        self.state.lock().await.log_queries.clone()
    }
}

#[async_trait]
impl SourceChain for MockSourceChain {
    async fn latest_block(&self) -> Result<u64, WatcherError> {
        let mut state = self.state.lock().await;
        state.latest_calls += 1;
        if state.latest_failures > 0 {
            state.latest_failures -= 1;
            return Err(WatcherError::Network("mock: head unavailable".to_string()));
        }
        let latest = state.latest;
        if state.auto_advance {
            state.latest += 1;
        }
        Ok(latest)
    }

    async fn filter_logs(&self, filter: &LogFilter) -> Result<Vec<RawLog>, WatcherError> {
        let mut state = self.state.lock().await;
        state.log_queries.push(filter.from_block);
        if state.log_failures > 0 {
            state.log_failures -= 1;
            return Err(WatcherError::Network("mock: log query failed".to_string()));
        }
        if filter.from_block > filter.to_block {
            return Ok(Vec::new());
        }
        Ok(state
            .logs
            .range(filter.from_block..=filter.to_block)
            .flat_map(|(_, logs)| logs.iter())
            .filter(|log| log.topics.first() == Some(&filter.topic))
            .cloned()
            .collect())
    }

    async fn stakers_length(&self) -> Result<u64, WatcherError> {
        let mut state = self.state.lock().await;
        if state.length_failures > 0 {
            state.length_failures -= 1;
            return Err(WatcherError::Network(
                "mock: registry unavailable".to_string(),
            ));
        }
        Ok(state.registry.len() as u64)
    }

    async fn staker_at(&self, index: u64) -> Result<Address, WatcherError> {
        let state = self.state.lock().await;
        if state.broken_indices.contains(&index) {
            return Err(WatcherError::Network(format!(
                "mock: stakers({}) reverted",
                index
            )));
        }
        state
            .registry
            .get(index as usize)
            .map(|(addr, _)| *addr)
            .ok_or_else(|| WatcherError::Network(format!("mock: index {} out of range", index)))
    }

    async fn staker_info(&self, staker: &Address) -> Result<StakerInfo, WatcherError> {
        let state = self.state.lock().await;
        state
            .registry
            .iter()
            .find(|(addr, _)| addr == staker)
            .map(|(_, value)| StakerInfo { value: *value })
            .ok_or_else(|| WatcherError::Network(format!("mock: unknown staker {}", staker)))
    }
}

#[derive(Debug, Default)]
struct DestinationState {
    submissions: Vec<(String, Vec<StakerRecord>)>,
    failures: u32,
}

/// Recording destination chain.
#[derive(Debug, Default)]
pub struct MockDestination {
    state: Mutex<DestinationState>,
}

impl MockDestination {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject the next `n` submissions.
    pub async fn fail_next_submissions(&self, n: u32) {
        self.state.lock().await.failures = n;
    }

    /// Every accepted submission, oldest first.
    pub async fn submissions(&self) -> Vec<(String, Vec<StakerRecord>)> {
        self.state.lock().await.submissions.clone()
    }
}

#[async_trait]
impl DestinationChain for MockDestination {
    async fn submit_tx(&self, call: &str, payload: &[StakerRecord]) -> Result<(), WatcherError> {
        let mut state = self.state.lock().await;
        if state.failures > 0 {
            state.failures -= 1;
            return Err(WatcherError::Submission(format!(
                "mock: {} rejected",
                call
            )));
        }
        tracing::info!("mock: {} accepted {} stake infos", call, payload.len());
        state.submissions.push((call.to_string(), payload.to_vec()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOPIC: [u8; 32] = [0xd0; 32];

    #[tokio::test]
    async fn auto_advance_grows_head() {
        let chain = MockSourceChain::new(10);
        chain.set_auto_advance(true).await;
        assert_eq!(chain.latest_block().await.unwrap(), 10);
        assert_eq!(chain.latest_block().await.unwrap(), 11);
    }

    #[tokio::test]
    async fn injected_head_failures_are_consumed() {
        let chain = MockSourceChain::new(5);
        chain.fail_next_latest(2).await;
        assert!(chain.latest_block().await.is_err());
        assert!(chain.latest_block().await.is_err());
        assert_eq!(chain.latest_block().await.unwrap(), 5);
        assert_eq!(chain.latest_calls().await, 3);
    }

    #[tokio::test]
    async fn logs_filtered_by_height_and_topic() {
        let chain = MockSourceChain::new(0);
        let staker = Address::from_bytes([1; 20]);
        chain.push_log(deposit_log(TOPIC, 7, staker, 1, 1)).await;
        chain.push_log(deposit_log([0; 32], 7, staker, 2, 1)).await;
        chain.push_log(deposit_log(TOPIC, 8, staker, 3, 1)).await;

        let logs = chain
            .filter_logs(&LogFilter::single_block(Address::default(), TOPIC, 7))
            .await
            .unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].block_number, 7);
        assert_eq!(chain.log_queries().await, vec![7]);
    }

    #[tokio::test]
    async fn registry_lookups() {
        let chain = MockSourceChain::new(0);
        let a = Address::from_bytes([1; 20]);
        chain.add_staker(a, 100).await;
        assert_eq!(chain.stakers_length().await.unwrap(), 1);
        assert_eq!(chain.staker_at(0).await.unwrap(), a);
        assert_eq!(chain.staker_info(&a).await.unwrap().value, 100);
        assert!(chain.staker_at(1).await.is_err());

        chain.break_index(0).await;
        assert!(chain.staker_at(0).await.is_err());
    }

    #[tokio::test]
    async fn destination_records_and_rejects() {
        let dest = MockDestination::new();
        let record = StakerRecord::new(Address::from_bytes([4; 20]), 9);

        dest.fail_next_submissions(1).await;
        assert!(matches!(
            dest.submit_tx("call", &[record.clone()]).await,
            Err(WatcherError::Submission(_))
        ));
        dest.submit_tx("call", &[record.clone()]).await.unwrap();

        let subs = dest.submissions().await;
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].1, vec![record]);
    }
}
