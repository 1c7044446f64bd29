//! Embedded relational store for the durable `network_validators(public_key, block_number)`
//! table — the only validator state that survives a process restart.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
    #[error("poisoned store mutex")]
    Poisoned,
}

pub struct NetworkValidatorStore {
    connection: Mutex<Connection>,
}

impl NetworkValidatorStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let connection = Connection::open(path)?;
        connection.execute(
            "CREATE TABLE IF NOT EXISTS network_validators (
                public_key TEXT PRIMARY KEY,
                block_number INTEGER NOT NULL
            )",
            [],
        )?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    pub fn in_memory() -> Result<Self, StoreError> {
        let connection = Connection::open_in_memory()?;
        connection.execute(
            "CREATE TABLE IF NOT EXISTS network_validators (
                public_key TEXT PRIMARY KEY,
                block_number INTEGER NOT NULL
            )",
            [],
        )?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, StoreError> {
        self.connection.lock().map_err(|_| StoreError::Poisoned)
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        let connection = self.lock()?;
        let count: i64 = connection.query_row("SELECT COUNT(*) FROM network_validators", [], |row| row.get(0))?;
        Ok(count == 0)
    }

    pub fn max_block_number(&self) -> Result<Option<u64>, StoreError> {
        let connection = self.lock()?;
        let max: Option<i64> =
            connection.query_row("SELECT MAX(block_number) FROM network_validators", [], |row| row.get(0))?;
        Ok(max.map(|v| v as u64))
    }

    pub fn is_registered(&self, pubkey: &[u8; 48]) -> Result<bool, StoreError> {
        let connection = self.lock()?;
        let count: i64 = connection.query_row(
            "SELECT COUNT(*) FROM network_validators WHERE public_key = ?1",
            params![hex::encode(pubkey)],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    pub fn insert(&self, pubkey: &[u8; 48], block_number: u64) -> Result<(), StoreError> {
        let connection = self.lock()?;
        connection.execute(
            "INSERT OR REPLACE INTO network_validators (public_key, block_number) VALUES (?1, ?2)",
            params![hex::encode(pubkey), block_number as i64],
        )?;
        Ok(())
    }

    pub fn bulk_insert(&self, rows: &[([u8; 48], u64)]) -> Result<(), StoreError> {
        let mut connection = self.lock()?;
        let tx = connection.transaction()?;
        for (pubkey, block_number) in rows {
            tx.execute(
                "INSERT OR REPLACE INTO network_validators (public_key, block_number) VALUES (?1, ?2)",
                params![hex::encode(pubkey), *block_number as i64],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    pub fn all_public_keys(&self) -> Result<Vec<[u8; 48]>, StoreError> {
        let connection = self.lock()?;
        let mut stmt = connection.prepare("SELECT public_key FROM network_validators")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut out = Vec::new();
        for row in rows {
            let hex_str = row?;
            let bytes = hex::decode(&hex_str).map_err(|_| rusqlite::Error::InvalidColumnType(
                0,
                "public_key".to_owned(),
                rusqlite::types::Type::Text,
            ))?;
            let pubkey: [u8; 48] = bytes.try_into().map_err(|_| {
                rusqlite::Error::InvalidColumnType(0, "public_key".to_owned(), rusqlite::types::Type::Text)
            })?;
            out.push(pubkey);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_lookup_round_trip() {
        let store = NetworkValidatorStore::in_memory().unwrap();
        assert!(store.is_empty().unwrap());

        let pk = [7u8; 48];
        store.insert(&pk, 100).unwrap();
        assert!(!store.is_empty().unwrap());
        assert!(store.is_registered(&pk).unwrap());
        assert!(!store.is_registered(&[9u8; 48]).unwrap());
        assert_eq!(store.max_block_number().unwrap(), Some(100));
    }

    #[test]
    fn bulk_insert_then_max_block_number_reflects_all_rows() {
        let store = NetworkValidatorStore::in_memory().unwrap();
        store
            .bulk_insert(&[([1u8; 48], 10), ([2u8; 48], 30), ([3u8; 48], 20)])
            .unwrap();
        assert_eq!(store.max_block_number().unwrap(), Some(30));
        assert_eq!(store.all_public_keys().unwrap().len(), 3);
    }
}
