use crate::{
    errors::FairDiceResult,
    game_store::OutcomeStore,
    games::{
        registry::GeneratorRegistry,
        types::{Outcome, DIE_MAX, DIE_MIN},
    },
};
use std::sync::Arc;

/// Drives single rounds: pick a generator, roll both dice, decide, persist
pub struct RoundOrchestrator {
    registry: Arc<GeneratorRegistry>,
    store: Arc<dyn OutcomeStore>,
}

impl RoundOrchestrator {
    pub fn new(registry: Arc<GeneratorRegistry>, store: Arc<dyn OutcomeStore>) -> Self {
        Self { registry, store }
    }

    pub fn registry(&self) -> &Arc<GeneratorRegistry> {
        &self.registry
    }

    /// Play one round and persist it.
    ///
    /// The outcome is returned only after the store accepted it; a storage
    /// failure means the round was not played.
    pub async fn play(&self, player_id: &str) -> FairDiceResult<Outcome> {
        let outcome = self.play_round(player_id)?;
        self.store.save(&outcome).await?;

        tracing::info!(
            round_id = %outcome.round_id,
            player_id = %outcome.player_id,
            generator = %outcome.generator_name,
            player_value = outcome.player_value,
            house_value = outcome.house_value,
            result = %outcome.result,
            "Round completed"
        );
        Ok(outcome)
    }

    /// Play one round without persisting it.
    ///
    /// Both dice come from the same generator instance, so a commit-reveal
    /// generator's counter advances twice per round.
    pub fn play_round(&self, player_id: &str) -> FairDiceResult<Outcome> {
        let generator = self.registry.pick_random()?;
        let round = generator.draw_round(DIE_MIN, DIE_MAX)?;

        Ok(Outcome::new(
            player_id.to_string(),
            round.player_value,
            round.house_value,
            generator.name(),
            round.disclosure,
        ))
    }
}
