// crates/stakewatch-sync/src/epoch.rs
//
// Epoch synchronizer: the commit step of the pipeline.
//
// At every height divisible by the epoch length:
//   1. Deposit path: submit the top-ranked accumulated deposits, then
//      clear the accumulator.
//   2. Registry path: enumerate and rank the registry, diff against the
//      last committed snapshot, submit `current_top ++ stopped`, then
//      write the snapshot and finally the cursor (`height + 1`).
//
// Nothing is cleared or committed unless the submission before it was
// accepted. Snapshot is always written before cursor, so a crash between
// the two resumes an already processed epoch against the new snapshot.

use std::collections::HashSet;
use std::fmt;

use stakewatch_core::{
    rank_top20, CheckpointStore, DestinationChain, SourceChain, StakerRecord, WatcherError,
    UPDATE_STAKE_INFO,
};

use crate::accumulator::EpochAccumulator;
use crate::snapshot::SnapshotBuilder;

/// Outcome of one epoch boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EpochReport {
    /// Boundary height.
    pub height: u64,
    /// Records in the registry update (ranked top plus stopped).
    pub submitted: usize,
    /// Stakers reported as stopped.
    pub stopped: usize,
    /// Ranked deposit records flushed from the accumulator.
    pub deposits_flushed: usize,
}

impl fmt::Display for EpochReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "epoch at block {}: submitted {} ({} stopped), flushed {} deposits",
            self.height, self.submitted, self.stopped, self.deposits_flushed
        )
    }
}

/// Runs the boundary work for each epoch.
#[derive(Debug, Clone)]
pub struct EpochSynchronizer {
    epoch_length: u64,
    builder: SnapshotBuilder,
}

impl EpochSynchronizer {
    pub fn new(epoch_length: u64, builder: SnapshotBuilder) -> Result<Self, WatcherError> {
        if epoch_length == 0 {
            return Err(WatcherError::Config(
                "Epoch length must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            epoch_length,
            builder,
        })
    }

    pub fn epoch_length(&self) -> u64 {
        self.epoch_length
    }

    pub fn is_boundary(&self, height: u64) -> bool {
        height % self.epoch_length == 0
    }

    /// Run both paths for boundary `height`.
    pub async fn on_boundary(
        &self,
        height: u64,
        source: &dyn SourceChain,
        dest: &dyn DestinationChain,
        store: &dyn CheckpointStore,
        accumulator: &mut EpochAccumulator,
    ) -> Result<EpochReport, WatcherError> {
        tracing::info!("Epoch boundary at block {}", height);

        let deposits_flushed = self.flush_deposits(dest, accumulator).await?;
        let (submitted, stopped) = self.sync_registry(height, source, dest, store).await?;

        let report = EpochReport {
            height,
            submitted,
            stopped,
            deposits_flushed,
        };
        tracing::info!("Committed {}", report);
        Ok(report)
    }

    /// Submit the ranked deposits collected this epoch.
    ///
    /// The accumulator is cleared only after the destination accepted the
    /// update. Returns the number of records submitted.
    pub async fn flush_deposits(
        &self,
        dest: &dyn DestinationChain,
        accumulator: &mut EpochAccumulator,
    ) -> Result<usize, WatcherError> {
        if accumulator.is_empty() {
            return Ok(0);
        }

        let ranked = rank_top20(accumulator.records());
        tracing::info!(
            "Flushing {} deposit records ({} accumulated)",
            ranked.len(),
            accumulator.len()
        );
        submit(dest, &ranked).await?;

        accumulator.clear();
        Ok(ranked.len())
    }

    /// Diff the registry against the committed snapshot, submit, commit.
    ///
    /// Returns `(submitted, stopped)` record counts.
    pub async fn sync_registry(
        &self,
        height: u64,
        source: &dyn SourceChain,
        dest: &dyn DestinationChain,
        store: &dyn CheckpointStore,
    ) -> Result<(usize, usize), WatcherError> {
        let snapshot = self.builder.build(source).await?;
        let current_top = rank_top20(&snapshot);
        let last_top = store.read_snapshot().await?;

        let stopped = stopped_stakers(&last_top, &current_top);
        for record in &stopped {
            tracing::info!("Staker {} stopped staking", record.work_base());
        }

        let mut payload = current_top.clone();
        payload.extend(stopped.iter().cloned());

        if payload.is_empty() {
            tracing::debug!("Registry update at block {} is empty, not submitting", height);
        } else {
            submit(dest, &payload).await?;
        }

        store.write_snapshot(&current_top).await?;
        store.write_cursor(height.saturating_add(1)).await?;

        Ok((payload.len(), stopped.len()))
    }
}

/// Records of `last_top` whose `work_base` is absent from `current_top`,
/// marked inactive. Each address is reported at most once.
pub fn stopped_stakers(last_top: &[StakerRecord], current_top: &[StakerRecord]) -> Vec<StakerRecord> {
    let current: HashSet<_> = current_top.iter().map(|r| *r.work_base()).collect();
    let mut seen = HashSet::new();

    last_top
        .iter()
        .filter(|r| !current.contains(r.work_base()))
        .filter(|r| seen.insert(*r.work_base()))
        .map(StakerRecord::stopped)
        .collect()
}

async fn submit(dest: &dyn DestinationChain, payload: &[StakerRecord]) -> Result<(), WatcherError> {
    dest.submit_tx(UPDATE_STAKE_INFO, payload)
        .await
        .map_err(|e| match e {
            WatcherError::Submission(msg) => WatcherError::Submission(msg),
            other => WatcherError::Submission(other.to_string()),
        })
}
