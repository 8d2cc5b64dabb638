// crates/stakewatch-daemon/src/config.rs
//
// Runtime configuration for the StakeWatch daemon.
// Loaded from a TOML file or populated with sensible defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use stakewatch_core::{Address, WatcherError};
use stakewatch_store::paths::{default_cursor_file, default_snapshot_file, expand_tilde};
use stakewatch_sync::{
    PollerConfig, DEFAULT_CONFIRMATIONS, DEFAULT_DEPOSIT_EVENT, DEFAULT_RETRY_INTERVAL,
    DEFAULT_RETRY_LIMIT,
};

/// Runtime configuration for the watcher.
#[derive(Debug, Clone, Deserialize)]
pub struct WatcherConfig {
    /// Ethereum JSON-RPC endpoint of the source chain.
    #[serde(default = "default_source_rpc_url")]
    pub source_rpc_url: String,

    /// Relay endpoint that submits extrinsics on the destination chain.
    #[serde(default = "default_destination_rpc_url")]
    pub destination_rpc_url: String,

    /// Staking registry contract (emits the deposit event).
    #[serde(default)]
    pub contract_address: String,

    /// Solidity signature of the deposit event.
    #[serde(default = "default_event_signature")]
    pub event_signature: String,

    /// First block to process when no cursor is persisted.
    #[serde(default)]
    pub start_block: u64,

    /// Blocks that must follow a height before it is processed.
    #[serde(default = "default_block_confirmations")]
    pub block_confirmations: u64,

    /// Consecutive transient failures tolerated at one height.
    #[serde(default = "default_retry_limit")]
    pub retry_limit: u32,

    /// Pause between attempts, in milliseconds.
    #[serde(default = "default_retry_interval_ms")]
    pub retry_interval_ms: u64,

    /// Blocks per epoch.
    #[serde(default = "default_epoch_length")]
    pub epoch_length: u64,

    /// Visit every n-th registry index when building snapshots.
    #[serde(default = "default_registry_stride")]
    pub registry_stride: u64,

    /// Cursor file; defaults to the per-OS data directory.
    #[serde(default)]
    pub cursor_file: Option<String>,

    /// Snapshot file; defaults to the per-OS data directory.
    #[serde(default)]
    pub snapshot_file: Option<String>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_source_rpc_url() -> String {
    "http://127.0.0.1:8545".to_string()
}

fn default_destination_rpc_url() -> String {
    "http://127.0.0.1:9933".to_string()
}

fn default_event_signature() -> String {
    DEFAULT_DEPOSIT_EVENT.to_string()
}

fn default_block_confirmations() -> u64 {
    DEFAULT_CONFIRMATIONS
}

fn default_retry_limit() -> u32 {
    DEFAULT_RETRY_LIMIT
}

fn default_retry_interval_ms() -> u64 {
    DEFAULT_RETRY_INTERVAL.as_millis() as u64
}

fn default_epoch_length() -> u64 {
    1000
}

fn default_registry_stride() -> u64 {
    1
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            source_rpc_url: default_source_rpc_url(),
            destination_rpc_url: default_destination_rpc_url(),
            contract_address: String::new(),
            event_signature: default_event_signature(),
            start_block: 0,
            block_confirmations: default_block_confirmations(),
            retry_limit: default_retry_limit(),
            retry_interval_ms: default_retry_interval_ms(),
            epoch_length: default_epoch_length(),
            registry_stride: default_registry_stride(),
            cursor_file: None,
            snapshot_file: None,
            log_level: default_log_level(),
        }
    }
}

impl WatcherConfig {
    /// Load configuration from a TOML file at the given path.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)?;
        let config: WatcherConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Check that the configuration can drive a watcher.
    ///
    /// In mock mode no endpoints or contract are needed.
    pub fn validate(&self, mock: bool) -> Result<(), WatcherError> {
        if self.epoch_length == 0 {
            return Err(WatcherError::Config("epoch_length must be at least 1".into()));
        }
        if self.registry_stride == 0 {
            return Err(WatcherError::Config(
                "registry_stride must be at least 1".into(),
            ));
        }
        if self.retry_limit == 0 {
            return Err(WatcherError::Config("retry_limit must be at least 1".into()));
        }
        if self.event_signature.trim().is_empty() {
            return Err(WatcherError::Config("event_signature is empty".into()));
        }
        if mock {
            return Ok(());
        }
        if self.source_rpc_url.is_empty() || self.destination_rpc_url.is_empty() {
            return Err(WatcherError::Config("RPC endpoints must be set".into()));
        }
        if self.contract_address.trim().is_empty() {
            return Err(WatcherError::Config("contract_address must be set".into()));
        }
        self.contract()?;
        Ok(())
    }

    /// Parsed contract address; the zero address when unset.
    pub fn contract(&self) -> Result<Address, WatcherError> {
        if self.contract_address.trim().is_empty() {
            return Ok(Address::default());
        }
        self.contract_address.parse().map_err(|e| {
            WatcherError::Config(format!(
                "Invalid contract_address {:?}: {}",
                self.contract_address, e
            ))
        })
    }

    pub fn cursor_path(&self) -> PathBuf {
        self.cursor_file
            .as_deref()
            .map(expand_tilde)
            .unwrap_or_else(default_cursor_file)
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.snapshot_file
            .as_deref()
            .map(expand_tilde)
            .unwrap_or_else(default_snapshot_file)
    }

    pub fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry_interval_ms)
    }

    /// Poller parameters, starting at `start_block`.
    pub fn poller_config(&self, start_block: u64) -> PollerConfig {
        PollerConfig {
            start_block,
            block_confirmations: self.block_confirmations,
            retry_limit: self.retry_limit,
            retry_interval: self.retry_interval(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn empty_file_yields_defaults() {
        let config: WatcherConfig = toml::from_str("").unwrap();
        assert_eq!(config.block_confirmations, 10);
        assert_eq!(config.retry_limit, 5);
        assert_eq!(config.retry_interval(), Duration::from_secs(5));
        assert_eq!(config.epoch_length, 1000);
        assert_eq!(config.registry_stride, 1);
        assert_eq!(config.event_signature, DEFAULT_DEPOSIT_EVENT);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.cursor_path(), default_cursor_file());
    }

    #[test]
    fn parses_full_config() {
        let toml = r#"
            source_rpc_url = "http://eth.local:8545"
            destination_rpc_url = "http://relay.local:9933"
            contract_address = "0x00000000000000000000000000000000000000aa"
            start_block = 1200
            block_confirmations = 3
            retry_limit = 7
            retry_interval_ms = 250
            epoch_length = 100
            registry_stride = 2
            snapshot_file = "/var/lib/stakewatch/stake_info.rlp"
            log_level = "debug"
        "#;
        let config: WatcherConfig = toml::from_str(toml).unwrap();
        config.validate(false).unwrap();
        assert_eq!(config.contract().unwrap().as_bytes()[19], 0xaa);
        assert_eq!(
            config.snapshot_path(),
            PathBuf::from("/var/lib/stakewatch/stake_info.rlp")
        );

        let poller = config.poller_config(1500);
        assert_eq!(poller.start_block, 1500);
        assert_eq!(poller.block_confirmations, 3);
        assert_eq!(poller.retry_limit, 7);
        assert_eq!(poller.retry_interval, Duration::from_millis(250));
    }

    #[test]
    fn validate_rejects_zero_epoch_and_stride() {
        let mut config = WatcherConfig::default();
        config.epoch_length = 0;
        assert!(matches!(config.validate(true), Err(WatcherError::Config(_))));

        let mut config = WatcherConfig::default();
        config.registry_stride = 0;
        assert!(config.validate(true).is_err());
    }

    #[test]
    fn contract_required_outside_mock_mode() {
        let config = WatcherConfig::default();
        assert!(config.validate(true).is_ok());
        assert!(config.validate(false).is_err());

        let mut config = WatcherConfig::default();
        config.contract_address = "0xnot-hex".to_string();
        assert!(matches!(config.contract(), Err(WatcherError::Config(_))));
    }

    #[test]
    fn load_reads_file_and_reports_missing() {
        let path = std::env::temp_dir().join(format!("stakewatch_test_config_{}.toml", Uuid::now_v7()));
        assert!(WatcherConfig::load(&path).is_err());

        fs::write(&path, "epoch_length = 42\n").unwrap();
        let config = WatcherConfig::load(&path).unwrap();
        assert_eq!(config.epoch_length, 42);
        let _ = fs::remove_file(&path);
    }
}
