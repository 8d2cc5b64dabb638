// crates/stakewatch-sync/src/scanner.rs
//
// Event scanner: turns one block's deposit logs into typed events.
//
// Decoding is positional and must match the emitting contract exactly:
//   topics[0] = keccak256(event signature)
//   topics[1] = staker (indexed address, left-padded to 32 bytes)
//   data[0..32]  = value   (uint256, big-endian)
//   data[32..64] = periods (uint16 padded to a 32-byte word)
// Reordering the event's arguments is a breaking change.

use stakewatch_core::crypto::event_topic;
use stakewatch_core::event::decode_uint_word;
use stakewatch_core::{Address, DepositEvent, LogFilter, RawLog, SourceChain, WatcherError};

/// Signature of the staking contract's deposit event.
pub const DEFAULT_DEPOSIT_EVENT: &str = "Deposited(address,uint256,uint16)";

/// Queries a single block for deposit events from a fixed contract.
#[derive(Debug, Clone)]
pub struct EventScanner {
    contract: Address,
    topic: [u8; 32],
}

impl EventScanner {
    /// Create a scanner for `event_signature` emitted by `contract`.
    pub fn new(contract: Address, event_signature: &str) -> Self {
        Self {
            contract,
            topic: event_topic(event_signature),
        }
    }

    pub fn contract(&self) -> &Address {
        &self.contract
    }

    pub fn topic(&self) -> &[u8; 32] {
        &self.topic
    }

    /// Fetch and decode every deposit event in block `height`.
    ///
    /// All logs are decoded before anything is returned, so a malformed
    /// log fails the whole block and no partial result escapes.
    pub async fn scan_block(
        &self,
        source: &dyn SourceChain,
        height: u64,
    ) -> Result<Vec<DepositEvent>, WatcherError> {
        tracing::debug!("Querying block {} for deposit events", height);

        let filter = LogFilter::single_block(self.contract, self.topic, height);
        let logs = source.filter_logs(&filter).await?;

        let events = logs
            .iter()
            .enumerate()
            .map(|(i, log)| {
                decode_deposit(log).map_err(|e| {
                    WatcherError::Decode(format!("Block {} log {}: {}", height, i, e))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        for event in &events {
            tracing::info!(
                "Found deposit event in block {}: staker={} value={} periods={}",
                height,
                event.staker,
                event.value,
                event.periods
            );
        }

        Ok(events)
    }
}

/// Decode one deposit log.
pub fn decode_deposit(log: &RawLog) -> Result<DepositEvent, WatcherError> {
    let staker_topic = log
        .topics
        .get(1)
        .ok_or_else(|| WatcherError::Decode("Deposit log has no staker topic".to_string()))?;

    if log.data.len() < 64 {
        return Err(WatcherError::Decode(format!(
            "Deposit data is {} bytes, expected 64",
            log.data.len()
        )));
    }

    Ok(DepositEvent {
        staker: Address::from_word(staker_topic)?,
        value: decode_uint_word(&log.data[..32])?,
        periods: decode_uint_word(&log.data[32..64])?,
    })
}
