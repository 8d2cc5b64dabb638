// crates/stakewatch-store/src/codec.rs
//
// RLP encoding of a staker snapshot.
//
// Layout: an outer list with one entry per record, each record a list of
//   [identity (32 bytes), work_base (20 bytes), is_active (0|1),
//    locked_balance (minimal big-endian bytes), work_count (u32)]
//
// Record order is preserved, so the ranked order survives a round trip.

use rlp::{DecoderError, Rlp, RlpStream};

use stakewatch_core::{AccountId, Address, StakerRecord, StakerSnapshot, WatcherError};

const RECORD_FIELDS: usize = 5;

/// Encode a snapshot into its on-disk byte form.
pub fn encode_snapshot(records: &[StakerRecord]) -> Vec<u8> {
    let mut stream = RlpStream::new_list(records.len());
    for record in records {
        let balance = record.locked_balance.to_be_bytes();
        stream.begin_list(RECORD_FIELDS);
        stream.append(&record.identity().as_bytes().as_slice());
        stream.append(&record.work_base().as_bytes().as_slice());
        stream.append(&u8::from(record.is_active));
        stream.append(&strip_leading_zeros(&balance));
        stream.append(&record.work_count);
    }
    stream.out().to_vec()
}

/// Decode a snapshot previously produced by [`encode_snapshot`].
pub fn decode_snapshot(bytes: &[u8]) -> Result<StakerSnapshot, WatcherError> {
    let rlp = Rlp::new(bytes);
    if !rlp.is_list() {
        return Err(WatcherError::Decode(
            "Snapshot is not an RLP list".to_string(),
        ));
    }

    let mut records = Vec::with_capacity(rlp.item_count().map_err(rlp_error)?);
    for item in rlp.iter() {
        records.push(decode_record(&item)?);
    }
    Ok(records)
}

fn decode_record(item: &Rlp) -> Result<StakerRecord, WatcherError> {
    if item.item_count().map_err(rlp_error)? != RECORD_FIELDS {
        return Err(rlp_error(DecoderError::RlpIncorrectListLen));
    }

    let identity: Vec<u8> = item.val_at(0).map_err(rlp_error)?;
    let work_base: Vec<u8> = item.val_at(1).map_err(rlp_error)?;
    let active: u8 = item.val_at(2).map_err(rlp_error)?;
    let balance: Vec<u8> = item.val_at(3).map_err(rlp_error)?;
    let work_count: u32 = item.val_at(4).map_err(rlp_error)?;

    let is_active = match active {
        0 => false,
        1 => true,
        other => {
            return Err(WatcherError::Decode(format!(
                "Invalid is_active flag {}",
                other
            )))
        }
    };

    StakerRecord::from_parts(
        AccountId::from_slice(&identity)?,
        Address::from_slice(&work_base)?,
        is_active,
        balance_from_bytes(&balance)?,
        work_count,
    )
}

fn strip_leading_zeros(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
    &bytes[start..]
}

fn balance_from_bytes(bytes: &[u8]) -> Result<u128, WatcherError> {
    if bytes.len() > 16 {
        return Err(WatcherError::Decode(format!(
            "Locked balance of {} bytes overflows u128",
            bytes.len()
        )));
    }
    let mut buf = [0u8; 16];
    buf[16 - bytes.len()..].copy_from_slice(bytes);
    Ok(u128::from_be_bytes(buf))
}

fn rlp_error(e: DecoderError) -> WatcherError {
    WatcherError::Decode(format!("RLP decode failed: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn staker(tag: u8, balance: u128) -> StakerRecord {
        StakerRecord::new(Address::from_bytes([tag; 20]), balance)
    }

    #[test]
    fn empty_snapshot_round_trip() {
        let bytes = encode_snapshot(&[]);
        assert_eq!(bytes, vec![0xc0]);
        assert!(decode_snapshot(&bytes).unwrap().is_empty());
    }

    #[test]
    fn preserves_inactive_flag_and_extreme_balances() {
        let records = vec![
            staker(1, 0).stopped(),
            staker(2, u128::MAX),
            staker(3, 256),
        ];
        let decoded = decode_snapshot(&encode_snapshot(&records)).unwrap();
        assert_eq!(decoded, records);
        assert!(!decoded[0].is_active);
    }

    #[test]
    fn rejects_non_list_payload() {
        // A bare RLP string rather than a list.
        let err = decode_snapshot(&[0x83, b'a', b'b', b'c']).unwrap_err();
        assert!(matches!(err, WatcherError::Decode(_)));
    }

    #[test]
    fn rejects_record_with_missing_fields() {
        let mut stream = RlpStream::new_list(1);
        stream.begin_list(2);
        stream.append(&1u8);
        stream.append(&2u8);
        let err = decode_snapshot(&stream.out()).unwrap_err();
        assert!(matches!(err, WatcherError::Decode(_)));
    }

    #[test]
    fn rejects_diverging_identity() {
        let mut stream = RlpStream::new_list(1);
        stream.begin_list(RECORD_FIELDS);
        stream.append(&[9u8; 32].as_slice());
        stream.append(&[1u8; 20].as_slice());
        stream.append(&1u8);
        stream.append(&[5u8].as_slice());
        stream.append(&0u32);
        assert!(decode_snapshot(&stream.out()).is_err());
    }
}
