// crates/stakewatch-store/src/memory.rs
//
// In-memory checkpoint store.
//
// Used by tests and by the daemon's mock mode. Keeps an ordered log of
// every write so callers can assert commit ordering, and supports
// injected write failures.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use stakewatch_core::{CheckpointStore, StakerRecord, StakerSnapshot, WatcherError};

/// One successful write, in the order it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckpointWrite {
    /// Snapshot written, with its record count.
    Snapshot(usize),
    /// Cursor written, with its height.
    Cursor(u64),
}

#[derive(Debug, Default)]
struct Inner {
    cursor: Option<u64>,
    snapshot: StakerSnapshot,
    writes: Vec<CheckpointWrite>,
}

/// Volatile checkpoint store.
#[derive(Debug, Default)]
pub struct InMemoryCheckpointStore {
    inner: RwLock<Inner>,
    fail_cursor_writes: AtomicBool,
    fail_snapshot_writes: AtomicBool,
}

impl InMemoryCheckpointStore {
    /// Create an empty store (no cursor, empty snapshot).
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds a checkpoint.
    pub fn with_checkpoint(cursor: u64, snapshot: StakerSnapshot) -> Self {
        Self {
            inner: RwLock::new(Inner {
                cursor: Some(cursor),
                snapshot,
                writes: Vec::new(),
            }),
            ..Self::default()
        }
    }

    /// Make subsequent cursor writes fail with a storage error.
    pub fn fail_cursor_writes(&self, fail: bool) {
        self.fail_cursor_writes.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent snapshot writes fail with a storage error.
    pub fn fail_snapshot_writes(&self, fail: bool) {
        self.fail_snapshot_writes.store(fail, Ordering::SeqCst);
    }

    /// All successful writes so far, oldest first.
    pub async fn writes(&self) -> Vec<CheckpointWrite> {
        self.inner.read().await.writes.clone()
    }

    /// The persisted cursor, `None` if never written.
    pub async fn cursor(&self) -> Option<u64> {
        self.inner.read().await.cursor
    }
}

#[async_trait]
impl CheckpointStore for InMemoryCheckpointStore {
    async fn read_cursor(&self) -> Result<u64, WatcherError> {
        Ok(self.inner.read().await.cursor.unwrap_or(0))
    }

    async fn write_cursor(&self, height: u64) -> Result<(), WatcherError> {
        if self.fail_cursor_writes.load(Ordering::SeqCst) {
            return Err(WatcherError::Storage(
                "Injected cursor write failure".to_string(),
            ));
        }
        let mut inner = self.inner.write().await;
        inner.cursor = Some(height);
        inner.writes.push(CheckpointWrite::Cursor(height));
        Ok(())
    }

    async fn read_snapshot(&self) -> Result<StakerSnapshot, WatcherError> {
        Ok(self.inner.read().await.snapshot.clone())
    }

    async fn write_snapshot(&self, snapshot: &[StakerRecord]) -> Result<(), WatcherError> {
        if self.fail_snapshot_writes.load(Ordering::SeqCst) {
            return Err(WatcherError::Storage(
                "Injected snapshot write failure".to_string(),
            ));
        }
        let mut inner = self.inner.write().await;
        inner.snapshot = snapshot.to_vec();
        inner.writes.push(CheckpointWrite::Snapshot(snapshot.len()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stakewatch_core::Address;

    #[tokio::test]
    async fn fresh_store_is_empty() {
        let store = InMemoryCheckpointStore::new();
        assert_eq!(store.read_cursor().await.unwrap(), 0);
        assert!(store.read_snapshot().await.unwrap().is_empty());
        assert_eq!(store.cursor().await, None);
    }

    #[tokio::test]
    async fn records_write_order() {
        let store = InMemoryCheckpointStore::new();
        let record = StakerRecord::new(Address::from_bytes([1; 20]), 10);
        store.write_snapshot(&[record.clone()]).await.unwrap();
        store.write_cursor(11).await.unwrap();

        assert_eq!(
            store.writes().await,
            vec![CheckpointWrite::Snapshot(1), CheckpointWrite::Cursor(11)]
        );
        assert_eq!(store.read_snapshot().await.unwrap(), vec![record]);
        assert_eq!(store.read_cursor().await.unwrap(), 11);
    }

    #[tokio::test]
    async fn injected_failures_leave_state_untouched() {
        let store = InMemoryCheckpointStore::with_checkpoint(5, Vec::new());
        store.fail_cursor_writes(true);
        assert!(store.write_cursor(6).await.is_err());
        assert_eq!(store.read_cursor().await.unwrap(), 5);
        assert!(store.writes().await.is_empty());
    }
}
