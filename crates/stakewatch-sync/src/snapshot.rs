// crates/stakewatch-sync/src/snapshot.rs
//
// Registry snapshot builder.
//
// Enumerates the source-chain staker registry and builds one active
// record per visited index. Entries that cannot be read are logged and
// skipped; only a failure to read the registry length fails the build.

use stakewatch_core::{SourceChain, StakerRecord, StakerSnapshot, WatcherError};

/// Builds a full staker snapshot from the source-chain registry.
#[derive(Debug, Clone, Copy)]
pub struct SnapshotBuilder {
    stride: u64,
}

impl SnapshotBuilder {
    /// Create a builder that visits every `stride`-th registry index.
    pub fn new(stride: u64) -> Result<Self, WatcherError> {
        if stride == 0 {
            return Err(WatcherError::Config(
                "Registry stride must be at least 1".to_string(),
            ));
        }
        Ok(Self { stride })
    }

    /// Builder that visits every registry index.
    pub fn full() -> Self {
        Self { stride: 1 }
    }

    pub fn stride(&self) -> u64 {
        self.stride
    }

    /// Enumerate the registry in index order.
    pub async fn build(&self, source: &dyn SourceChain) -> Result<StakerSnapshot, WatcherError> {
        let length = source.stakers_length().await?;
        tracing::debug!(
            "Enumerating {} registry entries (stride {})",
            length,
            self.stride
        );

        let mut snapshot = Vec::new();
        let mut index = 0u64;
        while index < length {
            match self.read_entry(source, index).await {
                Ok(record) => snapshot.push(record),
                Err(e) => {
                    tracing::warn!("Skipping registry entry {}: {}", index, e);
                }
            }
            index = index.saturating_add(self.stride);
        }

        tracing::info!(
            "Built registry snapshot with {} of {} stakers",
            snapshot.len(),
            length
        );
        Ok(snapshot)
    }

    async fn read_entry(
        &self,
        source: &dyn SourceChain,
        index: u64,
    ) -> Result<StakerRecord, WatcherError> {
        let staker = source.staker_at(index).await?;
        let info = source.staker_info(&staker).await?;
        Ok(StakerRecord::new(staker, info.value))
    }
}

impl Default for SnapshotBuilder {
    fn default() -> Self {
        Self::full()
    }
}
