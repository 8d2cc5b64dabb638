// crates/stakewatch-core/src/staker.rs
//
// Staker records as relayed to the destination chain.

use serde::Serialize;

use crate::account::{AccountId, Address};
use crate::error::WatcherError;

/// One staking participant as known to the source chain.
///
/// `identity` and `work_base` are both derived from the same source address
/// and can only be set together, through [`StakerRecord::new`] or the
/// checked [`StakerRecord::from_parts`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StakerRecord {
    /// Destination-chain account key.
    identity: AccountId,
    /// Raw source address, the equality key when diffing snapshots.
    work_base: Address,
    /// True while the staker is staking as of the last observation.
    pub is_active: bool,
    /// Locked amount.
    pub locked_balance: u128,
    /// Reserved; always zero at creation.
    pub work_count: u32,
}

/// An ordered sequence of staker records, either a full registry
/// enumeration or a ranked top-N reduction of one.
pub type StakerSnapshot = Vec<StakerRecord>;

impl StakerRecord {
    /// Create an active record for `address` with the given locked balance.
    pub fn new(address: Address, locked_balance: u128) -> Self {
        Self {
            identity: AccountId::from(address),
            work_base: address,
            is_active: true,
            locked_balance,
            work_count: 0,
        }
    }

    /// Rebuild a record from stored fields, checking that `identity` was
    /// derived from `work_base`.
    pub fn from_parts(
        identity: AccountId,
        work_base: Address,
        is_active: bool,
        locked_balance: u128,
        work_count: u32,
    ) -> Result<Self, WatcherError> {
        if identity != AccountId::from(work_base) {
            return Err(WatcherError::Decode(format!(
                "Staker identity {} does not match work base {}",
                identity, work_base
            )));
        }
        Ok(Self {
            identity,
            work_base,
            is_active,
            locked_balance,
            work_count,
        })
    }

    pub fn identity(&self) -> &AccountId {
        &self.identity
    }

    pub fn work_base(&self) -> &Address {
        &self.work_base
    }

    /// Copy of this record marked as no longer staking.
    pub fn stopped(&self) -> Self {
        Self {
            is_active: false,
            ..self.clone()
        }
    }
}

/// Registry view of a single staker, as returned by the source chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StakerInfo {
    /// Locked value.
    pub value: u128,
}
