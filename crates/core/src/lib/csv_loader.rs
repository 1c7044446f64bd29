//! Loads the `CONFIGURED_PUBLIC_KEYS_PATH` CSV file for §4.10's unregistered-set computation:
//! one `0x`-prefixed 48-byte BLS public key per line, whitespace stripped, empty rows skipped.

use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CsvLoaderError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse CSV row: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {0} is not a valid 48-byte hex public key: {1}")]
    InvalidPublicKey(usize, String),
    #[error("configured public keys file is empty, at least one row is required")]
    Empty,
}

/// Order-preserving: the returned list mirrors the file's row order.
pub fn load(path: &Path) -> Result<Vec<[u8; 48]>, CsvLoaderError> {
    let content = std::fs::read_to_string(path).map_err(|source| CsvLoaderError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let mut keys = Vec::new();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    for (row_index, record) in reader.records().enumerate() {
        let record = record?;
        let raw = record.get(0).unwrap_or("").trim();
        if raw.is_empty() {
            continue;
        }

        let hex_str = raw.trim_start_matches("0x");
        let bytes = hex::decode(hex_str).map_err(|_e| CsvLoaderError::InvalidPublicKey(row_index, raw.to_owned()))?;
        let pubkey: [u8; 48] = bytes
            .try_into()
            .map_err(|_| CsvLoaderError::InvalidPublicKey(row_index, raw.to_owned()))?;
        keys.push(pubkey);
    }

    if keys.is_empty() {
        return Err(CsvLoaderError::Empty);
    }

    Ok(keys)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("create temp file");
        file.write_all(content.as_bytes()).expect("write temp file");
        file
    }

    #[test]
    fn loads_and_preserves_order_skipping_blank_rows() {
        let pk_a = "0x".to_string() + &"11".repeat(48);
        let pk_b = "22".repeat(48);
        let file = write_temp(&format!("{pk_a}\n\n  \n{pk_b}\n"));
        let keys = load(file.path()).expect("should load");
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[0], [0x11u8; 48]);
        assert_eq!(keys[1], [0x22u8; 48]);
    }

    #[test]
    fn rejects_empty_file() {
        let file = write_temp("\n\n");
        assert!(matches!(load(file.path()), Err(CsvLoaderError::Empty)));
    }

    #[test]
    fn rejects_malformed_key() {
        let file = write_temp("not-hex\n");
        assert!(matches!(load(file.path()), Err(CsvLoaderError::InvalidPublicKey(..))));
    }
}
