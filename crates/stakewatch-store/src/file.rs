// crates/stakewatch-store/src/file.rs
//
// File-backed checkpoint store.
//
// Two independent files:
//   - cursor:   decimal text of the next block height to process
//   - snapshot: RLP-encoded ranked staker snapshot (see `codec`)
//
// Each file is replaced by writing a sibling `.tmp` file and renaming it
// over the target, so a reader never observes a half-written file. There
// is no transaction spanning both files; callers order the writes. Trait
// calls run the file I/O on tokio's blocking pool.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use stakewatch_core::{CheckpointStore, StakerRecord, StakerSnapshot, WatcherError};

use crate::codec::{decode_snapshot, encode_snapshot};
use crate::paths::{CURSOR_FILE_NAME, SNAPSHOT_FILE_NAME};

/// Checkpoint store backed by a cursor file and a snapshot file.
#[derive(Debug, Clone)]
pub struct FileCheckpointStore {
    cursor_path: PathBuf,
    snapshot_path: PathBuf,
}

impl FileCheckpointStore {
    pub fn new(cursor_path: impl Into<PathBuf>, snapshot_path: impl Into<PathBuf>) -> Self {
        Self {
            cursor_path: cursor_path.into(),
            snapshot_path: snapshot_path.into(),
        }
    }

    /// Store using the default file names inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self::new(dir.join(CURSOR_FILE_NAME), dir.join(SNAPSHOT_FILE_NAME))
    }

    pub fn cursor_path(&self) -> &Path {
        &self.cursor_path
    }

    pub fn snapshot_path(&self) -> &Path {
        &self.snapshot_path
    }

    /// Read the cursor without going through the async trait.
    pub fn read_cursor_sync(&self) -> Result<u64, WatcherError> {
        let Some(bytes) = read_optional(&self.cursor_path)? else {
            tracing::debug!("Cursor file {} does not exist", self.cursor_path.display());
            return Ok(0);
        };

        let text = String::from_utf8_lossy(&bytes);
        let text = text.trim();
        if text.is_empty() {
            return Ok(0);
        }
        text.parse::<u64>().map_err(|e| {
            WatcherError::Decode(format!(
                "Invalid block height {:?} in {}: {}",
                text,
                self.cursor_path.display(),
                e
            ))
        })
    }

    pub fn write_cursor_sync(&self, height: u64) -> Result<(), WatcherError> {
        write_atomic(&self.cursor_path, height.to_string().as_bytes())
    }

    /// Read the snapshot without going through the async trait.
    pub fn read_snapshot_sync(&self) -> Result<StakerSnapshot, WatcherError> {
        let Some(bytes) = read_optional(&self.snapshot_path)? else {
            tracing::warn!(
                "Stake info file {} does not exist",
                self.snapshot_path.display()
            );
            return Ok(Vec::new());
        };

        if bytes.is_empty() {
            tracing::warn!("Stake info file {} is empty", self.snapshot_path.display());
            return Ok(Vec::new());
        }

        decode_snapshot(&bytes).map_err(|e| {
            tracing::error!(
                "Failed to decode stake info file {}: {}",
                self.snapshot_path.display(),
                e
            );
            e
        })
    }

    pub fn write_snapshot_sync(&self, snapshot: &[StakerRecord]) -> Result<(), WatcherError> {
        write_atomic(&self.snapshot_path, &encode_snapshot(snapshot))?;
        tracing::info!(
            "Wrote stake info file {} ({} stakers)",
            self.snapshot_path.display(),
            snapshot.len()
        );
        Ok(())
    }
}

/// Run a filesystem operation on the blocking pool.
async fn blocking<T, F>(f: F) -> Result<T, WatcherError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, WatcherError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| WatcherError::Storage(format!("Checkpoint I/O task failed: {}", e)))?
}

#[async_trait]
impl CheckpointStore for FileCheckpointStore {
    async fn read_cursor(&self) -> Result<u64, WatcherError> {
        let store = self.clone();
        blocking(move || store.read_cursor_sync()).await
    }

    async fn write_cursor(&self, height: u64) -> Result<(), WatcherError> {
        let store = self.clone();
        blocking(move || store.write_cursor_sync(height)).await
    }

    async fn read_snapshot(&self) -> Result<StakerSnapshot, WatcherError> {
        let store = self.clone();
        blocking(move || store.read_snapshot_sync()).await
    }

    async fn write_snapshot(&self, snapshot: &[StakerRecord]) -> Result<(), WatcherError> {
        let store = self.clone();
        let snapshot = snapshot.to_vec();
        blocking(move || store.write_snapshot_sync(&snapshot)).await
    }
}

/// Read a whole file, mapping "not found" to `None`.
fn read_optional(path: &Path) -> Result<Option<Vec<u8>>, WatcherError> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(WatcherError::Storage(format!(
            "Failed to read {}: {}",
            path.display(),
            e
        ))),
    }
}

/// Replace `path` with `bytes`, creating parent directories as needed.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), WatcherError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| {
                WatcherError::Storage(format!(
                    "Failed to create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    let tmp = tmp_path(path);
    fs::write(&tmp, bytes).map_err(|e| {
        WatcherError::Storage(format!("Failed to write {}: {}", tmp.display(), e))
    })?;
    fs::rename(&tmp, path).map_err(|e| {
        WatcherError::Storage(format!(
            "Failed to move {} to {}: {}",
            tmp.display(),
            path.display(),
            e
        ))
    })
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
