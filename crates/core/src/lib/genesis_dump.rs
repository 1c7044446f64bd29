//! Parser for the genesis validators dump: a concatenation of 52-byte records, each
//! `block_number (4 bytes, big-endian) || pubkey (48 bytes)`.

use thiserror::Error;

pub const RECORD_SIZE: usize = 52;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenesisRecord {
    pub block_number: u64,
    pub pubkey: [u8; 48],
}

#[derive(Debug, Error)]
pub enum GenesisDumpError {
    #[error("genesis dump length {0} is not a multiple of {RECORD_SIZE}")]
    NotAMultipleOfRecordSize(usize),
}

/// Total on inputs whose length is a multiple of [`RECORD_SIZE`]; fails on every other input.
pub fn parse(bytes: &[u8]) -> Result<Vec<GenesisRecord>, GenesisDumpError> {
    if bytes.len() % RECORD_SIZE != 0 {
        return Err(GenesisDumpError::NotAMultipleOfRecordSize(bytes.len()));
    }

    bytes
        .chunks_exact(RECORD_SIZE)
        .map(|chunk| {
            let block_number = u32::from_be_bytes(chunk[0..4].try_into().unwrap()) as u64;
            let pubkey: [u8; 48] = chunk[4..52].try_into().unwrap();
            Ok(GenesisRecord { block_number, pubkey })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(block_number: u32, fill: u8) -> Vec<u8> {
        let mut out = block_number.to_be_bytes().to_vec();
        out.extend(std::iter::repeat(fill).take(48));
        out
    }

    #[test]
    fn parses_a_multiple_of_record_size() {
        let mut bytes = record(10, 0xAA);
        bytes.extend(record(20, 0xBB));
        let parsed = parse(&bytes).expect("should parse");
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].block_number, 10);
        assert_eq!(parsed[0].pubkey, [0xAAu8; 48]);
        assert_eq!(parsed[1].block_number, 20);
    }

    #[test]
    fn rejects_lengths_not_a_multiple_of_52() {
        let bytes = vec![0u8; 53];
        assert!(parse(&bytes).is_err());
    }

    #[test]
    fn empty_input_parses_to_empty_vec() {
        assert_eq!(parse(&[]).unwrap(), vec![]);
    }
}
