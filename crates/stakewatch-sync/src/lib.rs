// crates/stakewatch-sync/src/lib.rs
//
// stakewatch-sync: The block-polling / epoch-synchronization engine.
//
// The `BlockPoller` walks source-chain heights one at a time behind a
// confirmation depth. Each height is scanned for deposit events by the
// `EventScanner` and absorbed into the `EpochAccumulator`. At epoch
// boundaries the `EpochSynchronizer` rebuilds the registry snapshot,
// diffs it against the last committed one, submits the update to the
// destination chain, and commits snapshot then cursor.

pub mod accumulator;
pub mod epoch;
pub mod poller;
pub mod scanner;
pub mod snapshot;
pub mod state;

pub use accumulator::EpochAccumulator;
pub use epoch::{stopped_stakers, EpochReport, EpochSynchronizer};
pub use poller::{
    resume_height, BlockPoller, PollerConfig, DEFAULT_CONFIRMATIONS, DEFAULT_RETRY_INTERVAL,
    DEFAULT_RETRY_LIMIT,
};
pub use scanner::{decode_deposit, EventScanner, DEFAULT_DEPOSIT_EVENT};
pub use snapshot::SnapshotBuilder;
pub use state::{PollerState, PollerStateMachine};
