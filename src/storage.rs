//! RocksDB-backed outcome storage
//!
//! Key layout:
//! - `round:result:<round_id>` → JSON outcome
//! - `round:index:player:` | player len (u32 BE) | player | inverted created_at nanos (u64 BE) | round_id → empty
//! - `round:count` → u64 LE
//!
//! The inverted timestamp makes a forward prefix scan return newest rounds first.

use crate::{
    errors::StorageError,
    game_store::OutcomeStore,
    games::types::Outcome,
};
use async_trait::async_trait;
use rocksdb::{Direction, IteratorMode, Options, WriteBatch, DB};
use std::{
    path::Path,
    sync::{Arc, Mutex},
};

const ROUND_RESULT_PREFIX: &str = "round:result:";
const PLAYER_INDEX_PREFIX: &[u8] = b"round:index:player:";
const ROUND_COUNT_KEY: &[u8] = b"round:count";

fn round_result_key(round_id: &str) -> Vec<u8> {
    format!("{}{}", ROUND_RESULT_PREFIX, round_id).into_bytes()
}

fn player_index_prefix(player_id: &str) -> Vec<u8> {
    let player = player_id.as_bytes();
    let mut key = Vec::with_capacity(PLAYER_INDEX_PREFIX.len() + 4 + player.len());
    key.extend_from_slice(PLAYER_INDEX_PREFIX);
    key.extend_from_slice(&(player.len() as u32).to_be_bytes());
    key.extend_from_slice(player);
    key
}

fn player_index_key(outcome: &Outcome) -> Vec<u8> {
    let nanos = outcome
        .created_at
        .timestamp_nanos_opt()
        .map(|n| n.max(0) as u64)
        .unwrap_or_default();
    let inverted = u64::MAX - nanos;

    let mut key = player_index_prefix(&outcome.player_id);
    key.extend_from_slice(&inverted.to_be_bytes());
    key.extend_from_slice(outcome.round_id.as_bytes());
    key
}

fn parse_u64_le(bytes: &[u8]) -> Option<u64> {
    let arr: [u8; 8] = bytes.try_into().ok()?;
    Some(u64::from_le_bytes(arr))
}

/// Outcome store on a local RocksDB database
#[derive(Clone)]
pub struct RocksOutcomeStore {
    db: Arc<DB>,
    // Serializes save so the duplicate check and counter update stay consistent.
    write_lock: Arc<Mutex<()>>,
}

impl RocksOutcomeStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.set_compression_type(rocksdb::DBCompressionType::Lz4);

        let db = DB::open(&opts, path.as_ref()).map_err(|e| {
            StorageError::DatabaseOpenFailed(format!("{}: {}", path.as_ref().display(), e))
        })?;

        Ok(Self {
            db: Arc::new(db),
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    fn save_blocking(&self, outcome: &Outcome) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());

        let key = round_result_key(&outcome.round_id);
        if self.db.get(&key).map_err(StorageError::read)?.is_some() {
            return Err(StorageError::Duplicate(outcome.round_id.clone()));
        }

        let bytes = serde_json::to_vec(outcome).map_err(|e| {
            StorageError::WriteFailed(format!(
                "Failed to encode outcome for round {}: {}",
                outcome.round_id, e
            ))
        })?;
        let count = self.count_blocking()?;

        let mut batch = WriteBatch::default();
        batch.put(&key, bytes);
        batch.put(player_index_key(outcome), b"");
        batch.put(ROUND_COUNT_KEY, (count + 1).to_le_bytes());
        self.db.write(batch).map_err(StorageError::write)?;

        tracing::debug!(round_id = %outcome.round_id, "Outcome persisted");
        Ok(())
    }

    fn load_blocking(&self, round_id: &str) -> Result<Outcome, StorageError> {
        let bytes = self
            .db
            .get(round_result_key(round_id))
            .map_err(StorageError::read)?
            .ok_or_else(|| StorageError::NotFound(round_id.to_string()))?;

        serde_json::from_slice(&bytes).map_err(|e| {
            StorageError::CorruptedData(format!(
                "Failed to decode outcome for round {}: {}",
                round_id, e
            ))
        })
    }

    fn list_blocking(
        &self,
        player_id: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Outcome>, StorageError> {
        let prefix = player_index_prefix(player_id);
        let id_offset = prefix.len() + 8;

        let mut outcomes = Vec::new();
        let rows = self
            .db
            .iterator(IteratorMode::From(prefix.as_slice(), Direction::Forward))
            .skip(offset);

        for row in rows {
            let (key, _) = row.map_err(StorageError::read)?;
            if !key.starts_with(&prefix) || outcomes.len() >= limit {
                break;
            }
            if key.len() <= id_offset {
                continue;
            }

            let round_id = std::str::from_utf8(&key[id_offset..]).map_err(|e| {
                StorageError::CorruptedData(format!("Invalid round id in player index: {}", e))
            })?;
            outcomes.push(self.load_blocking(round_id)?);
        }

        Ok(outcomes)
    }

    fn count_blocking(&self) -> Result<u64, StorageError> {
        Ok(self
            .db
            .get(ROUND_COUNT_KEY)
            .map_err(StorageError::read)?
            .and_then(|b| parse_u64_le(&b))
            .unwrap_or(0))
    }

    async fn run_blocking<T, F>(&self, op: F) -> Result<T, StorageError>
    where
        T: Send + 'static,
        F: FnOnce(RocksOutcomeStore) -> Result<T, StorageError> + Send + 'static,
    {
        let store = self.clone();
        tokio::task::spawn_blocking(move || op(store))
            .await
            .map_err(|e| StorageError::ReadFailed(format!("Storage task failed: {}", e)))?
    }
}

#[async_trait]
impl OutcomeStore for RocksOutcomeStore {
    async fn save(&self, outcome: &Outcome) -> Result<(), StorageError> {
        let outcome = outcome.clone();
        self.run_blocking(move |store| store.save_blocking(&outcome)).await
    }

    async fn load_by_id(&self, round_id: &str) -> Result<Outcome, StorageError> {
        let round_id = round_id.to_string();
        self.run_blocking(move |store| store.load_blocking(&round_id)).await
    }

    async fn list_by_player(
        &self,
        player_id: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Outcome>, StorageError> {
        let player_id = player_id.to_string();
        self.run_blocking(move |store| store.list_blocking(&player_id, limit, offset))
            .await
    }

    async fn count(&self) -> Result<u64, StorageError> {
        self.run_blocking(|store| store.count_blocking()).await
    }
}
