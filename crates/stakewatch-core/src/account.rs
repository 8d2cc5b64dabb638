// crates/stakewatch-core/src/account.rs
//
// Account identifiers on both sides of the relay.
//
// - `Address`: 20-byte source-chain (EVM) account address.
// - `AccountId`: 32-byte destination-chain account key, derived from an
//   `Address` by left-padding with zeroes. This is the same layout as an
//   indexed `address` topic in an EVM log.

use std::fmt;
use std::str::FromStr;

use ethabi::ethereum_types::H256;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::WatcherError;

/// A 20-byte source-chain account address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address(ethabi::Address);

impl Address {
    /// Byte length of an address.
    pub const LEN: usize = 20;

    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(ethabi::ethereum_types::H160(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        self.0.as_fixed_bytes()
    }

    /// Build an address from a byte slice of exactly 20 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, WatcherError> {
        if bytes.len() != Self::LEN {
            return Err(WatcherError::Decode(format!(
                "Address must be {} bytes, got {}",
                Self::LEN,
                bytes.len()
            )));
        }
        Ok(Self(ethabi::Address::from_slice(bytes)))
    }

    /// Extract an address from a 32-byte ABI word (topic or return value).
    ///
    /// The upper 12 bytes must be zero; anything else is not an address.
    pub fn from_word(word: &[u8; 32]) -> Result<Self, WatcherError> {
        if word[..12].iter().any(|b| *b != 0) {
            return Err(WatcherError::Decode(format!(
                "Word 0x{} is not a left-padded address",
                hex::encode(word)
            )));
        }
        Self::from_slice(&word[12..])
    }

    /// Left-pad the address into a 32-byte ABI word.
    pub fn to_word(&self) -> [u8; 32] {
        H256::from(self.0).to_fixed_bytes()
    }
}

impl From<ethabi::Address> for Address {
    fn from(address: ethabi::Address) -> Self {
        Self(address)
    }
}

impl From<Address> for ethabi::Address {
    fn from(address: Address) -> Self {
        address.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0.as_bytes()))
    }
}

impl FromStr for Address {
    type Err = WatcherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let raw = raw.strip_prefix("0x").unwrap_or(raw);
        let bytes = hex::decode(raw)?;
        Self::from_slice(&bytes)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A 32-byte destination-chain account key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct AccountId([u8; 32]);

impl AccountId {
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, WatcherError> {
        let arr: [u8; 32] = bytes.try_into().map_err(|_| {
            WatcherError::Decode(format!("AccountId must be 32 bytes, got {}", bytes.len()))
        })?;
        Ok(Self(arr))
    }
}

impl From<Address> for AccountId {
    fn from(address: Address) -> Self {
        Self(address.to_word())
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl Serialize for AccountId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RAW: &str = "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed";

    #[test]
    fn parse_and_display_round_trip() {
        let addr: Address = RAW.parse().unwrap();
        assert_eq!(addr.to_string(), RAW);

        // Prefix is optional and case is ignored on input.
        let bare: Address = "5AAEB6053F3E94C9B9A09F33669435E7EF1BEAED".parse().unwrap();
        assert_eq!(addr, bare);
    }

    #[test]
    fn parse_rejects_wrong_length() {
        assert!("0x1234".parse::<Address>().is_err());
        assert!("0xzz".parse::<Address>().is_err());
    }

    #[test]
    fn word_layout_matches_indexed_topic() {
        let addr = Address::from_bytes([0xab; 20]);
        let word = addr.to_word();
        assert_eq!(&word[..12], &[0u8; 12]);
        assert_eq!(Address::from_word(&word).unwrap(), addr);
    }

    #[test]
    fn word_with_dirty_padding_is_rejected() {
        let mut word = Address::from_bytes([1; 20]).to_word();
        word[0] = 1;
        assert!(matches!(
            Address::from_word(&word),
            Err(WatcherError::Decode(_))
        ));
    }

    #[test]
    fn converts_to_and_from_abi_address() {
        let addr: Address = RAW.parse().unwrap();
        let abi: ethabi::Address = addr.into();
        assert_eq!(abi.as_bytes(), addr.as_bytes());
        assert_eq!(Address::from(abi), addr);
    }

    #[test]
    fn account_id_is_padded_address() {
        let addr = Address::from_bytes([7; 20]);
        let id = AccountId::from(addr);
        assert_eq!(id.as_bytes(), &addr.to_word());
    }

    #[test]
    fn address_serializes_as_hex_string() {
        let addr: Address = RAW.parse().unwrap();
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"{}\"", RAW));
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
    }
}
