use thiserror::Error;

/// Watcher-wide error types for StakeWatch.
#[derive(Debug, Error)]
pub enum WatcherError {
    /// Transport failure talking to the source or destination chain.
    /// The only transient class: the poller retries it within its budget.
    #[error("Network error: {0}")]
    Network(String),

    /// Malformed log payload, RPC response, or persisted record.
    #[error("Decode error: {0}")]
    Decode(String),

    /// The destination chain failed to accept a stake-info update.
    #[error("Submission error: {0}")]
    Submission(String),

    /// Checkpoint persistence error (directory creation, file I/O).
    #[error("Storage error: {0}")]
    Storage(String),

    /// Invalid or inconsistent configuration.
    #[error("Config error: {0}")]
    Config(String),

    /// Invalid state transition.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// The poller ran out of retries for a single block height.
    #[error("Polling failed at block {height}: retries exceeded after {attempts} attempts")]
    RetriesExceeded { height: u64, attempts: u32 },
}

impl WatcherError {
    /// Whether the poller may retry the failed height instead of stopping.
    pub fn is_transient(&self) -> bool {
        matches!(self, WatcherError::Network(_))
    }
}

impl From<std::io::Error> for WatcherError {
    fn from(e: std::io::Error) -> Self {
        WatcherError::Storage(e.to_string())
    }
}

impl From<hex::FromHexError> for WatcherError {
    fn from(e: hex::FromHexError) -> Self {
        WatcherError::Decode(e.to_string())
    }
}
