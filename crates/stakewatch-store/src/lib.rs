// crates/stakewatch-store/src/lib.rs
//
// stakewatch-store: Persistence layer for StakeWatch.
//
// Provides the file-backed checkpoint store (decimal cursor file plus an
// RLP-encoded snapshot file), an in-memory store for tests and mock runs,
// the snapshot codec, and per-OS default file locations.

pub mod codec;
pub mod file;
pub mod memory;
pub mod paths;

// Re-export key types for ergonomic access from downstream crates.
pub use codec::{decode_snapshot, encode_snapshot};
pub use file::FileCheckpointStore;
pub use memory::{CheckpointWrite, InMemoryCheckpointStore};
