//! Post-hoc verification of commit-reveal rounds.
//!
//! Given a round id and a client-supplied seed, the engine recomputes
//! `SHA-256(house_seed:client_seed:draw_count)` from the stored disclosure. A
//! digest that differs from the published one yields `false`. Otherwise the
//! first two 4-byte windows of that one digest are mapped to die faces and
//! compared with the stored player and house values.

use crate::{
    errors::{FairDiceError, FairDiceResult, StorageError, VerificationError},
    fairness::{Commitment, Disclosure},
    game_store::OutcomeStore,
    games::types::{GeneratorKind, DIE_MAX, DIE_MIN},
};
use std::sync::Arc;

pub struct VerificationEngine {
    store: Arc<dyn OutcomeStore>,
}

impl VerificationEngine {
    pub fn new(store: Arc<dyn OutcomeStore>) -> Self {
        Self { store }
    }

    /// Check a stored round against a client seed.
    ///
    /// Precondition failures (unknown round, wrong generator, missing or
    /// malformed disclosure) are errors; a mismatch is `Ok(false)`. Read-only,
    /// so repeated calls with the same inputs agree.
    pub async fn verify(&self, round_id: &str, client_seed: &str) -> FairDiceResult<bool> {
        let outcome = self.store.load_by_id(round_id).await.map_err(|e| match e {
            StorageError::NotFound(id) => FairDiceError::from(VerificationError::NotFound(id)),
            other => FairDiceError::from(other),
        })?;

        if outcome.generator_name != GeneratorKind::CommitReveal.as_str() {
            return Err(VerificationError::NotVerifiable(outcome.generator_name).into());
        }

        let disclosure: Disclosure = match outcome.disclosure.as_deref() {
            Some(text) if !text.is_empty() => text.parse()?,
            _ => return Err(VerificationError::MissingDisclosure.into()),
        };

        let commitment =
            Commitment::compute(&disclosure.house_seed, client_seed, disclosure.draw_count);
        if commitment.to_hex() != disclosure.commit_hash {
            tracing::debug!(round_id, "Commitment mismatch");
            return Ok(false);
        }

        let player_candidate = commitment.value_in_range(0, DIE_MIN, DIE_MAX);
        let house_candidate = commitment.value_in_range(1, DIE_MIN, DIE_MAX);

        let is_valid =
            player_candidate == outcome.player_value && house_candidate == outcome.house_value;
        tracing::debug!(round_id, is_valid, "Round verified");
        Ok(is_valid)
    }
}
