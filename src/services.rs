//! Service layer providing dependency injection and the game use cases
//!
//! [`ServiceBuilder`] wires the generator registry, outcome store and metrics
//! from an [`AppConfig`]; any collaborator can be overridden for tests.

use crate::{
    config::{AppConfig, GameConfig, StorageBackend},
    errors::{FairDiceResult, StorageError},
    game_store::{clamp_limit, InMemoryOutcomeStore, OutcomeStore},
    games::{
        generators::{CommitRevealGenerator, SecureUniformGenerator, SeedSource, UniformGenerator},
        registry::{GeneratorRegistry, IndexSource, SeededIndexSource},
        types::{Outcome, ANONYMOUS_PLAYER},
        RoundOrchestrator, VerificationEngine,
    },
    metrics::{FairDiceMetrics, VerificationLabel},
    storage::RocksOutcomeStore,
};
use std::{sync::Arc, time::Instant};

/// Use-case facade over the orchestrator, verifier and store
pub struct DiceGameService {
    orchestrator: RoundOrchestrator,
    verifier: VerificationEngine,
    store: Arc<dyn OutcomeStore>,
    metrics: FairDiceMetrics,
}

impl DiceGameService {
    pub fn new(
        registry: Arc<GeneratorRegistry>,
        store: Arc<dyn OutcomeStore>,
        metrics: FairDiceMetrics,
    ) -> Self {
        Self {
            orchestrator: RoundOrchestrator::new(registry, store.clone()),
            verifier: VerificationEngine::new(store.clone()),
            store,
            metrics,
        }
    }

    /// Play a round; an empty player id plays as [`ANONYMOUS_PLAYER`]
    pub async fn play(&self, player_id: &str) -> FairDiceResult<Outcome> {
        let player_id = if player_id.is_empty() {
            ANONYMOUS_PLAYER
        } else {
            player_id
        };

        let started = Instant::now();
        let outcome = self.orchestrator.play(player_id).await?;
        self.metrics.record_round(
            &outcome.generator_name,
            outcome.result.as_str(),
            started.elapsed(),
        );
        Ok(outcome)
    }

    /// Verify a stored commit-reveal round against a client seed
    pub async fn verify(&self, round_id: &str, client_seed: &str) -> FairDiceResult<bool> {
        let result = self.verifier.verify(round_id, client_seed).await;
        let label = match result {
            Ok(true) => VerificationLabel::Valid,
            Ok(false) => VerificationLabel::Invalid,
            Err(ref e) => {
                tracing::warn!(round_id, error = %e, "Verification failed");
                VerificationLabel::Error
            }
        };
        self.metrics.record_verification(label);
        result
    }

    pub async fn get_outcome(&self, round_id: &str) -> FairDiceResult<Outcome> {
        Ok(self.store.load_by_id(round_id).await?)
    }

    /// A player's rounds, newest first. `limit` is clamped to `[1, 100]`.
    pub async fn outcomes_by_player(
        &self,
        player_id: &str,
        limit: Option<usize>,
        offset: Option<usize>,
    ) -> FairDiceResult<Vec<Outcome>> {
        let outcomes = self
            .store
            .list_by_player(player_id, clamp_limit(limit), offset.unwrap_or(0))
            .await?;
        Ok(outcomes)
    }

    pub async fn total_rounds(&self) -> FairDiceResult<u64> {
        Ok(self.store.count().await?)
    }

    /// Names of the active generators, in registration order
    pub fn generator_names(&self) -> Vec<&'static str> {
        self.orchestrator.registry().names()
    }

    pub fn metrics(&self) -> &FairDiceMetrics {
        &self.metrics
    }
}

/// Registry holding `uniform` and `secure_uniform`, plus `commit_reveal` when
/// verification is enabled
pub fn build_registry(
    game: &GameConfig,
    index_source: Box<dyn IndexSource>,
    seed_source: Option<SeedSource>,
) -> GeneratorRegistry {
    let registry = GeneratorRegistry::new(index_source);
    registry.register(UniformGenerator::new());
    registry.register(SecureUniformGenerator::new());

    if game.enable_verification {
        let house_seed = game
            .house_seed
            .clone()
            .unwrap_or_else(CommitRevealGenerator::generate_house_seed);
        let generator = match seed_source {
            Some(seed_source) => CommitRevealGenerator::new(house_seed, seed_source),
            None => CommitRevealGenerator::with_timestamp_seeds(house_seed),
        };
        registry.register(generator);
    }

    registry
}

/// Open the configured outcome store
pub fn open_store(config: &AppConfig) -> FairDiceResult<Arc<dyn OutcomeStore>> {
    match config.storage.backend {
        StorageBackend::Memory => Ok(Arc::new(InMemoryOutcomeStore::new())),
        StorageBackend::Rocksdb => {
            std::fs::create_dir_all(&config.storage.data_dir).map_err(|e| {
                StorageError::DatabaseOpenFailed(format!("{}: {}", config.storage.data_dir, e))
            })?;
            Ok(Arc::new(RocksOutcomeStore::open(&config.storage.data_dir)?))
        }
    }
}

/// Service builder for creating a configured [`DiceGameService`]
pub struct ServiceBuilder {
    config: AppConfig,
    store_override: Option<Arc<dyn OutcomeStore>>,
    index_source: Option<Box<dyn IndexSource>>,
    seed_source: Option<SeedSource>,
}

impl ServiceBuilder {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            store_override: None,
            index_source: None,
            seed_source: None,
        }
    }

    /// Override the outcome store (useful for testing)
    pub fn with_store(mut self, store: Arc<dyn OutcomeStore>) -> Self {
        self.store_override = Some(store);
        self
    }

    /// Override generator selection (useful for testing)
    pub fn with_index_source(mut self, index_source: Box<dyn IndexSource>) -> Self {
        self.index_source = Some(index_source);
        self
    }

    /// Override the commit-reveal seed source
    pub fn with_seed_source(mut self, seed_source: SeedSource) -> Self {
        self.seed_source = Some(seed_source);
        self
    }

    pub fn build(self) -> FairDiceResult<DiceGameService> {
        let store = match self.store_override {
            Some(store) => store,
            None => open_store(&self.config)?,
        };

        let index_source = self
            .index_source
            .unwrap_or_else(|| Box::new(SeededIndexSource::new()));
        let registry = build_registry(&self.config.game, index_source, self.seed_source);

        tracing::info!(
            generators = ?registry.names(),
            backend = ?self.config.storage.backend,
            verification = self.config.game.enable_verification,
            "Dice game service ready"
        );

        Ok(DiceGameService::new(
            Arc::new(registry),
            store,
            FairDiceMetrics::new()?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        errors::{FairDiceError, VerificationError},
        fairness::Commitment,
        games::registry::SequenceIndexSource,
    };

    fn memory_config(enable_verification: bool) -> AppConfig {
        let mut config = AppConfig::default();
        config.storage.backend = StorageBackend::Memory;
        config.game.enable_verification = enable_verification;
        config.game.house_seed = Some("S".to_string());
        config
    }

    #[test]
    fn test_registry_follows_verification_toggle() {
        let enabled = build_registry(&memory_config(true).game, Box::new(SeededIndexSource::new()), None);
        assert_eq!(enabled.names(), vec!["uniform", "secure_uniform", "commit_reveal"]);

        let disabled = build_registry(&memory_config(false).game, Box::new(SeededIndexSource::new()), None);
        assert_eq!(disabled.names(), vec!["uniform", "secure_uniform"]);
    }

    #[test]
    fn test_house_seed_generated_when_absent() {
        let mut game = memory_config(true).game;
        game.house_seed = None;
        let registry = build_registry(&game, Box::new(SeededIndexSource::new()), None);

        let generator = registry.pick_by_name("commit_reveal").unwrap();
        assert!(generator
            .as_commit_reveal()
            .unwrap()
            .house_seed()
            .starts_with("server-seed-"));
    }

    #[tokio::test]
    async fn test_empty_player_id_plays_anonymous() {
        let service = ServiceBuilder::new(memory_config(true)).build().unwrap();

        let outcome = service.play("").await.unwrap();
        assert_eq!(outcome.player_id, ANONYMOUS_PLAYER);

        let named = service.play("alice").await.unwrap();
        assert_eq!(named.player_id, "alice");

        assert_eq!(service.total_rounds().await.unwrap(), 2);
        assert_eq!(service.get_outcome(&named.round_id).await.unwrap(), named);
        assert_eq!(
            service.outcomes_by_player(ANONYMOUS_PLAYER, None, None).await.unwrap().len(),
            1
        );
    }

    #[tokio::test]
    async fn test_history_limit_clamped() {
        let service = ServiceBuilder::new(memory_config(false)).build().unwrap();
        for _ in 0..3 {
            service.play("bob").await.unwrap();
        }

        let one = service.outcomes_by_player("bob", Some(0), None).await.unwrap();
        assert_eq!(one.len(), 1);

        let rest = service.outcomes_by_player("bob", Some(500), Some(1)).await.unwrap();
        assert_eq!(rest.len(), 2);
    }

    #[tokio::test]
    async fn test_rounds_counted_in_metrics() {
        let service = ServiceBuilder::new(memory_config(true))
            .with_index_source(Box::new(SequenceIndexSource::new(vec![2])))
            .with_seed_source(Arc::new(|| "C".to_string()))
            .build()
            .unwrap();

        let outcome = service.play("alice").await.unwrap();
        assert_eq!(outcome.generator_name, "commit_reveal");
        assert_eq!(
            service
                .metrics()
                .rounds("commit_reveal", outcome.result.as_str()),
            1
        );
    }

    #[tokio::test]
    async fn test_verify_runs_with_verification_disabled() {
        let store: Arc<dyn OutcomeStore> = Arc::new(InMemoryOutcomeStore::new());
        let commitment = Commitment::compute("S", "C", 2);
        let stored = Outcome::new(
            "alice".to_string(),
            commitment.value_in_range(0, 1, 6),
            commitment.value_in_range(1, 1, 6),
            "commit_reveal",
            Some(format!("S:2:{}", commitment.to_hex())),
        );
        store.save(&stored).await.unwrap();

        let service = ServiceBuilder::new(memory_config(false))
            .with_store(store)
            .build()
            .unwrap();

        assert!(service.verify(&stored.round_id, "C").await.unwrap());
        assert!(!service.verify(&stored.round_id, "D").await.unwrap());

        let err = service.verify("missing", "C").await.unwrap_err();
        assert!(matches!(
            err,
            FairDiceError::Verification(VerificationError::NotFound(_))
        ));

        let metrics = service.metrics();
        assert_eq!(metrics.verifications(VerificationLabel::Valid), 1);
        assert_eq!(metrics.verifications(VerificationLabel::Invalid), 1);
        assert_eq!(metrics.verifications(VerificationLabel::Error), 1);
    }

    #[tokio::test]
    async fn test_unknown_round_lookup() {
        let service = ServiceBuilder::new(memory_config(true)).build().unwrap();
        assert!(matches!(
            service.get_outcome("nope").await,
            Err(FairDiceError::Storage(StorageError::NotFound(_)))
        ));
    }

    #[tokio::test]
    async fn test_rocksdb_backend_opens_nested_dir() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut config = memory_config(true);
        config.storage.backend = StorageBackend::Rocksdb;
        config.storage.data_dir = dir.path().join("nested/db").to_string_lossy().to_string();

        let service = ServiceBuilder::new(config).build().unwrap();
        let outcome = service.play("alice").await.unwrap();
        assert_eq!(service.get_outcome(&outcome.round_id).await.unwrap(), outcome);
    }
}
