// crates/stakewatch-core/src/lib.rs
//
// stakewatch-core: Core types, traits, and primitives for the StakeWatch
// cross-chain relay watcher.
//
// This is the leaf crate that all other crates in the workspace depend on.
// It defines the staker data model, the error type, the chain and
// checkpoint trait seams, the top-N ranking, and the keccak helper used to
// derive event topics.

pub mod account;
pub mod crypto;
pub mod error;
pub mod event;
pub mod ranking;
pub mod staker;
pub mod traits;

// Re-export key types for ergonomic access from downstream crates.
// Usage: `use stakewatch_core::StakerRecord;`

// Account types
pub use account::{AccountId, Address};

// Event types
pub use event::{DepositEvent, LogFilter, RawLog};

// Staker types
pub use staker::{StakerInfo, StakerRecord, StakerSnapshot};

// Ranking
pub use ranking::{rank_top, rank_top20, TOP_STAKERS};

// Error type
pub use error::WatcherError;

// Traits
pub use traits::{CheckpointStore, DestinationChain, SourceChain, UPDATE_STAKE_INFO};
