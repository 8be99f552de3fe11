//! Outcome persistence boundary.
//!
//! The round orchestrator writes through [`OutcomeStore::save`] and the
//! verification engine reads through [`OutcomeStore::load_by_id`]. A missing
//! round is always reported as [`StorageError::NotFound`].

use crate::{errors::StorageError, games::types::Outcome};
use async_trait::async_trait;
use dashmap::DashMap;

/// Default page size for player history
pub const DEFAULT_PAGE_LIMIT: usize = 20;

/// Largest page size for player history
pub const MAX_PAGE_LIMIT: usize = 100;

/// Clamp a requested page size into `[1, MAX_PAGE_LIMIT]`
pub fn clamp_limit(limit: Option<usize>) -> usize {
    limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT)
}

/// Durable storage for played rounds
#[async_trait]
pub trait OutcomeStore: Send + Sync {
    /// Persist a new outcome; a round id may be stored only once
    async fn save(&self, outcome: &Outcome) -> Result<(), StorageError>;

    /// Load an outcome by round id
    async fn load_by_id(&self, round_id: &str) -> Result<Outcome, StorageError>;

    /// A player's outcomes, newest first
    async fn list_by_player(
        &self,
        player_id: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Outcome>, StorageError>;

    /// Total number of stored outcomes
    async fn count(&self) -> Result<u64, StorageError>;
}

/// Process-local store used by tests and the `memory` backend
#[derive(Default)]
pub struct InMemoryOutcomeStore {
    outcomes: DashMap<String, Outcome>,
    by_player: DashMap<String, Vec<String>>,
}

impl InMemoryOutcomeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OutcomeStore for InMemoryOutcomeStore {
    async fn save(&self, outcome: &Outcome) -> Result<(), StorageError> {
        match self.outcomes.entry(outcome.round_id.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                return Err(StorageError::Duplicate(outcome.round_id.clone()));
            }
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(outcome.clone());
            }
        }

        self.by_player
            .entry(outcome.player_id.clone())
            .or_default()
            .push(outcome.round_id.clone());
        Ok(())
    }

    async fn load_by_id(&self, round_id: &str) -> Result<Outcome, StorageError> {
        self.outcomes
            .get(round_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| StorageError::NotFound(round_id.to_string()))
    }

    async fn list_by_player(
        &self,
        player_id: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Outcome>, StorageError> {
        let Some(round_ids) = self.by_player.get(player_id) else {
            return Ok(Vec::new());
        };

        Ok(round_ids
            .iter()
            .rev()
            .skip(offset)
            .take(limit)
            .filter_map(|id| self.outcomes.get(id).map(|entry| entry.value().clone()))
            .collect())
    }

    async fn count(&self) -> Result<u64, StorageError> {
        Ok(self.outcomes.len() as u64)
    }
}
