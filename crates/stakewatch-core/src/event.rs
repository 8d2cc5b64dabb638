// crates/stakewatch-core/src/event.rs
//
// Source-chain log types and the decoded deposit event.

use ethabi::Uint;

use crate::account::Address;
use crate::error::WatcherError;
use crate::staker::StakerRecord;

/// A log query over a contract address, a single event topic, and an
/// inclusive block range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFilter {
    pub address: Address,
    pub topic: [u8; 32],
    pub from_block: u64,
    pub to_block: u64,
}

impl LogFilter {
    /// Filter covering exactly one block.
    pub fn single_block(address: Address, topic: [u8; 32], height: u64) -> Self {
        Self {
            address,
            topic,
            from_block: height,
            to_block: height,
        }
    }
}

/// A raw log entry as returned by the source chain.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawLog {
    pub block_number: u64,
    /// `topics[0]` is the event signature hash; indexed arguments follow.
    pub topics: Vec<[u8; 32]>,
    pub data: Vec<u8>,
}

/// A decoded deposit. Ephemeral: only the derived [`StakerRecord`] is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositEvent {
    pub staker: Address,
    pub value: u128,
    pub periods: u128,
}

impl DepositEvent {
    pub fn to_record(&self) -> StakerRecord {
        StakerRecord::new(self.staker, self.value)
    }
}

/// Decode a big-endian unsigned 32-byte ABI word into a `u128`.
pub fn decode_uint_word(word: &[u8]) -> Result<u128, WatcherError> {
    if word.len() != 32 {
        return Err(WatcherError::Decode(format!(
            "ABI word must be 32 bytes, got {}",
            word.len()
        )));
    }
    uint_to_u128(Uint::from_big_endian(word))
}

/// Narrow an ABI `uint256` to `u128`. Wider values are rejected, never truncated.
pub fn uint_to_u128(value: Uint) -> Result<u128, WatcherError> {
    if value.bits() > 128 {
        return Err(WatcherError::Decode(format!("Value {} overflows u128", value)));
    }
    Ok(value.as_u128())
}

/// Narrow an ABI `uint256` to `u64`.
pub fn uint_to_u64(value: Uint) -> Result<u64, WatcherError> {
    if value.bits() > 64 {
        return Err(WatcherError::Decode(format!("Value {} overflows u64", value)));
    }
    Ok(value.as_u64())
}
