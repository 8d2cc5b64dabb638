// crates/stakewatch-sync/src/poller.rs
//
// Block poller: the driving loop of the watcher.
//
// Walks source-chain heights strictly in order. A height `h` is processed
// only once the head `L` satisfies `L >= h + confirmations`. Transient
// (network) failures are retried at the same height within a retry budget
// that resets after every processed block; any other failure stops the
// loop. The stop signal is checked at the top of every iteration and
// interrupts the wait between attempts, but never an in-flight RPC.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use stakewatch_core::{CheckpointStore, DestinationChain, SourceChain, WatcherError};

use crate::accumulator::EpochAccumulator;
use crate::epoch::EpochSynchronizer;
use crate::scanner::EventScanner;
use crate::state::{PollerState, PollerStateMachine};

/// Default number of consecutive transient failures tolerated per height.
pub const DEFAULT_RETRY_LIMIT: u32 = 5;
/// Default pause between attempts.
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(5);
/// Default confirmation depth.
pub const DEFAULT_CONFIRMATIONS: u64 = 10;

/// Poller parameters.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// First height to process.
    pub start_block: u64,
    /// Blocks that must follow a height before it is processed.
    pub block_confirmations: u64,
    /// Consecutive transient failures tolerated at one height.
    pub retry_limit: u32,
    /// Pause between attempts, also used while waiting for confirmations.
    pub retry_interval: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            start_block: 0,
            block_confirmations: DEFAULT_CONFIRMATIONS,
            retry_limit: DEFAULT_RETRY_LIMIT,
            retry_interval: DEFAULT_RETRY_INTERVAL,
        }
    }
}

/// Height to start from after a restart: the persisted cursor, unless
/// the configured start height is further ahead.
pub async fn resume_height(
    store: &dyn CheckpointStore,
    configured_start: u64,
) -> Result<u64, WatcherError> {
    let persisted = store.read_cursor().await?;
    let height = persisted.max(configured_start);
    tracing::info!(
        "Resuming at block {} (persisted cursor {}, configured start {})",
        height,
        persisted,
        configured_start
    );
    Ok(height)
}

/// Drives scanning and epoch synchronization block by block.
pub struct BlockPoller {
    config: PollerConfig,
    source: Arc<dyn SourceChain>,
    dest: Arc<dyn DestinationChain>,
    store: Arc<dyn CheckpointStore>,
    scanner: EventScanner,
    synchronizer: EpochSynchronizer,
    accumulator: EpochAccumulator,
    state: PollerStateMachine,
    stop: watch::Receiver<bool>,
    current: u64,
    retries_left: u32,
}

impl BlockPoller {
    pub fn new(
        config: PollerConfig,
        source: Arc<dyn SourceChain>,
        dest: Arc<dyn DestinationChain>,
        store: Arc<dyn CheckpointStore>,
        scanner: EventScanner,
        synchronizer: EpochSynchronizer,
        stop: watch::Receiver<bool>,
    ) -> Self {
        Self {
            current: config.start_block,
            retries_left: config.retry_limit,
            config,
            source,
            dest,
            store,
            scanner,
            synchronizer,
            accumulator: EpochAccumulator::new(),
            state: PollerStateMachine::new(),
            stop,
        }
    }

    /// Next height to process.
    pub fn current_height(&self) -> u64 {
        self.current
    }

    pub fn state(&self) -> PollerState {
        self.state.current()
    }

    pub fn accumulator(&self) -> &EpochAccumulator {
        &self.accumulator
    }

    /// Run until stopped.
    ///
    /// Returns `Ok(())` when the stop signal is raised, and an error when
    /// the retry budget for one height runs out or processing hits a
    /// non-transient failure.
    pub async fn run(&mut self) -> Result<(), WatcherError> {
        if self.state.is_stopped() {
            return Err(WatcherError::InvalidState(
                "Poller already stopped".to_string(),
            ));
        }

        tracing::info!(
            "Block poller starting at block {} ({} confirmations, epoch length {})",
            self.current,
            self.config.block_confirmations,
            self.synchronizer.epoch_length()
        );

        loop {
            if *self.stop.borrow() {
                tracing::info!("Polling terminated by request at block {}", self.current);
                self.state.transition(PollerState::Stopped)?;
                return Ok(());
            }

            if self.retries_left == 0 {
                tracing::error!(
                    "Polling failed at block {}: retries exceeded",
                    self.current
                );
                self.state.transition(PollerState::Stopped)?;
                return Err(WatcherError::RetriesExceeded {
                    height: self.current,
                    attempts: self.config.retry_limit,
                });
            }

            let latest = match self.source.latest_block().await {
                Ok(latest) => latest,
                Err(e) => {
                    self.retry_after(e).await?;
                    continue;
                }
            };

            if latest < self.current.saturating_add(self.config.block_confirmations) {
                tracing::debug!(
                    "Block {} not confirmed yet (latest {}, need {} confirmations)",
                    self.current,
                    latest,
                    self.config.block_confirmations
                );
                self.wait().await;
                continue;
            }

            self.state.transition(PollerState::Processing)?;
            match self.process_block(self.current).await {
                Ok(()) => {
                    self.state.transition(PollerState::Polling)?;
                    self.current += 1;
                    self.retries_left = self.config.retry_limit;
                }
                Err(e) => self.retry_after(e).await?,
            }
        }
    }

    /// Scan one height, absorb its deposits, and run epoch work on
    /// boundaries.
    async fn process_block(&mut self, height: u64) -> Result<(), WatcherError> {
        tracing::debug!("Processing block {}", height);

        let events = self.scanner.scan_block(self.source.as_ref(), height).await?;
        let records = events.iter().map(|e| e.to_record()).collect();
        self.accumulator.absorb(height, records);

        if self.synchronizer.is_boundary(height) {
            self.synchronizer
                .on_boundary(
                    height,
                    self.source.as_ref(),
                    self.dest.as_ref(),
                    self.store.as_ref(),
                    &mut self.accumulator,
                )
                .await?;
        }
        Ok(())
    }

    /// Spend one retry on a transient error, or stop on anything else.
    async fn retry_after(&mut self, err: WatcherError) -> Result<(), WatcherError> {
        if !err.is_transient() {
            tracing::error!("Polling failed at block {}: {}", self.current, err);
            self.state.transition(PollerState::Stopped)?;
            return Err(err);
        }

        self.retries_left = self.retries_left.saturating_sub(1);
        tracing::warn!(
            "Block {} failed ({} retries left): {}",
            self.current,
            self.retries_left,
            err
        );

        self.state.transition(PollerState::RetryWait)?;
        if self.retries_left > 0 {
            self.wait().await;
        }
        self.state.transition(PollerState::Polling)?;
        Ok(())
    }

    /// Sleep for the retry interval, returning early if a stop is requested.
    async fn wait(&mut self) {
        let sleep = tokio::time::sleep(self.config.retry_interval);
        tokio::pin!(sleep);

        loop {
            tokio::select! {
                _ = &mut sleep => return,
                changed = self.stop.changed() => {
                    if changed.is_err() {
                        // Sender gone: no stop can arrive any more.
                        (&mut sleep).await;
                        return;
                    }
                    if *self.stop.borrow_and_update() {
                        return;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::DEFAULT_DEPOSIT_EVENT;
    use crate::snapshot::SnapshotBuilder;
    use stakewatch_core::Address;
    use stakewatch_rpc::{MockDestination, MockSourceChain};
    use stakewatch_store::InMemoryCheckpointStore;

    fn poller(
        source: Arc<MockSourceChain>,
        config: PollerConfig,
        stop: watch::Receiver<bool>,
    ) -> BlockPoller {
        BlockPoller::new(
            config,
            source,
            Arc::new(MockDestination::new()),
            Arc::new(InMemoryCheckpointStore::new()),
            EventScanner::new(Address::default(), DEFAULT_DEPOSIT_EVENT),
            EpochSynchronizer::new(1000, SnapshotBuilder::full()).unwrap(),
            stop,
        )
    }

    fn fast_config(start: u64) -> PollerConfig {
        PollerConfig {
            start_block: start,
            block_confirmations: 0,
            retry_limit: 3,
            retry_interval: Duration::from_millis(1),
        }
    }

    #[test]
    fn default_config() {
        let config = PollerConfig::default();
        assert_eq!(config.retry_limit, 5);
        assert_eq!(config.block_confirmations, 10);
        assert_eq!(config.retry_interval, Duration::from_secs(5));
    }

    #[tokio::test]
    async fn stop_before_start_returns_ok() {
        let (_tx, rx) = watch::channel(true);
        let source = Arc::new(MockSourceChain::new(100));
        let mut p = poller(source.clone(), fast_config(1), rx);

        p.run().await.unwrap();
        assert_eq!(p.state(), PollerState::Stopped);
        assert_eq!(p.current_height(), 1);
        assert_eq!(source.latest_calls().await, 0);
    }

    #[tokio::test]
    async fn stopped_poller_cannot_rerun() {
        let (_tx, rx) = watch::channel(true);
        let mut p = poller(Arc::new(MockSourceChain::new(0)), fast_config(1), rx);
        p.run().await.unwrap();
        assert!(matches!(p.run().await, Err(WatcherError::InvalidState(_))));
    }

    #[tokio::test]
    async fn head_failures_exhaust_budget() {
        let (_tx, rx) = watch::channel(false);
        let source = Arc::new(MockSourceChain::new(100));
        source.fail_next_latest(3).await;
        let mut p = poller(source.clone(), fast_config(7), rx);

        match p.run().await {
            Err(WatcherError::RetriesExceeded { height, attempts }) => {
                assert_eq!(height, 7);
                assert_eq!(attempts, 3);
            }
            other => panic!("Expected RetriesExceeded, got: {:?}", other),
        }
        assert_eq!(source.latest_calls().await, 3);
        assert_eq!(p.current_height(), 7);
        assert_eq!(p.state(), PollerState::Stopped);
    }

    #[tokio::test]
    async fn budget_resets_after_success() {
        let (tx, rx) = watch::channel(false);
        let source = Arc::new(MockSourceChain::new(100));
        // Two failures, a success at block 1, then two more failures at
        // block 2: never three in a row.
        source.fail_next_latest(2).await;
        let mut p = poller(source.clone(), fast_config(1), rx);

        let handle = tokio::spawn(async move {
            let result = p.run().await;
            (p, result)
        });
        tokio::time::sleep(Duration::from_millis(50)).await;
        source.fail_next_latest(2).await;
        tokio::time::sleep(Duration::from_millis(50)).await;
        tx.send(true).unwrap();

        let (p, result) = handle.await.unwrap();
        result.unwrap();
        assert!(p.current_height() > 1);
    }
}
