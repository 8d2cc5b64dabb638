// crates/stakewatch-core/src/traits.rs

use async_trait::async_trait;

use crate::account::Address;
use crate::error::WatcherError;
use crate::event::{LogFilter, RawLog};
use crate::staker::{StakerInfo, StakerRecord, StakerSnapshot};

/// Destination-chain call that replaces the relayed stake-info set.
pub const UPDATE_STAKE_INFO: &str = "update_stake_info";

/// Read access to the source chain and its staking registry.
///
/// Implemented by stakewatch-rpc (Ethereum JSON-RPC and mock backends).
#[async_trait]
pub trait SourceChain: Send + Sync {
    /// Height of the latest block known to the node.
    async fn latest_block(&self) -> Result<u64, WatcherError>;

    /// All logs matching the filter.
    async fn filter_logs(&self, filter: &LogFilter) -> Result<Vec<RawLog>, WatcherError>;

    /// Number of entries in the staker registry.
    async fn stakers_length(&self) -> Result<u64, WatcherError>;

    /// Staker address at a registry index.
    async fn staker_at(&self, index: u64) -> Result<Address, WatcherError>;

    /// Registry info (locked value) for a staker.
    async fn staker_info(&self, staker: &Address) -> Result<StakerInfo, WatcherError>;
}

/// Write access to the destination chain.
#[async_trait]
pub trait DestinationChain: Send + Sync {
    /// Submit `payload` as the argument of the named call.
    async fn submit_tx(&self, call: &str, payload: &[StakerRecord]) -> Result<(), WatcherError>;
}

/// Durable checkpoint of the pipeline: the block cursor and the last
/// committed ranked snapshot.
///
/// Implemented by stakewatch-store. A missing checkpoint is not an error.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Next block height to process, or 0 if nothing was persisted.
    async fn read_cursor(&self) -> Result<u64, WatcherError>;

    /// Persist the next block height to process.
    async fn write_cursor(&self, height: u64) -> Result<(), WatcherError>;

    /// Last committed snapshot, or empty if nothing was persisted.
    async fn read_snapshot(&self) -> Result<StakerSnapshot, WatcherError>;

    /// Replace the committed snapshot.
    async fn write_snapshot(&self, snapshot: &[StakerRecord]) -> Result<(), WatcherError>;
}
