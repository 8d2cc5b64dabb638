// crates/stakewatch-sync/src/accumulator.rs
//
// Deposit accumulator for the current epoch.
//
// Each processed height contributes its decoded deposits exactly once:
// a height at or below the last absorbed one is ignored, so re-processing
// a block after a transient failure never duplicates records.

use stakewatch_core::{StakerRecord, StakerSnapshot};

/// Staker records built from deposit events since the last flush.
#[derive(Debug, Default, Clone)]
pub struct EpochAccumulator {
    records: StakerSnapshot,
    last_absorbed: Option<u64>,
}

impl EpochAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the records produced by block `height`.
    ///
    /// Returns false (and changes nothing) if `height` was already absorbed.
    pub fn absorb(&mut self, height: u64, records: Vec<StakerRecord>) -> bool {
        if self.last_absorbed.is_some_and(|last| height <= last) {
            tracing::debug!(
                "Block {} already absorbed (last {:?}), skipping",
                height,
                self.last_absorbed
            );
            return false;
        }
        self.records.extend(records);
        self.last_absorbed = Some(height);
        true
    }

    pub fn records(&self) -> &[StakerRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drop all records after a successful flush. The absorbed-height mark
    /// is kept.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn last_absorbed(&self) -> Option<u64> {
        self.last_absorbed
    }
}
