//! Generator registry and per-round strategy selection

use crate::{errors::RegistryError, games::generators::ValueGenerator};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::{
    sync::{Arc, Mutex, RwLock},
    time::{SystemTime, UNIX_EPOCH},
};

/// Source of indices for random generator selection.
///
/// Shared process-wide by the registry behind a lock; implementations only need
/// to return a value in `[0, len)`.
pub trait IndexSource: Send {
    fn next_index(&mut self, len: usize) -> usize;
}

/// Pseudo-random index source, seeded once at construction
pub struct SeededIndexSource {
    rng: StdRng,
}

impl SeededIndexSource {
    /// Seed from the current time
    pub fn new() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default();
        Self::with_seed(nanos)
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for SeededIndexSource {
    fn default() -> Self {
        Self::new()
    }
}

impl IndexSource for SeededIndexSource {
    fn next_index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }
}

/// Replays a fixed sequence of indices (reduced modulo the registry size)
pub struct SequenceIndexSource {
    sequence: Vec<usize>,
    position: usize,
}

impl SequenceIndexSource {
    pub fn new(sequence: Vec<usize>) -> Self {
        Self {
            sequence,
            position: 0,
        }
    }
}

impl IndexSource for SequenceIndexSource {
    fn next_index(&mut self, len: usize) -> usize {
        if self.sequence.is_empty() {
            return 0;
        }
        let value = self.sequence[self.position % self.sequence.len()];
        self.position = self.position.wrapping_add(1);
        value % len
    }
}

/// Ordered set of active generators.
///
/// Generators are only ever appended. Lookup by name returns the first match.
pub struct GeneratorRegistry {
    generators: RwLock<Vec<Arc<ValueGenerator>>>,
    index_source: Mutex<Box<dyn IndexSource>>,
}

impl GeneratorRegistry {
    pub fn new(index_source: Box<dyn IndexSource>) -> Self {
        Self {
            generators: RwLock::new(Vec::new()),
            index_source: Mutex::new(index_source),
        }
    }

    pub fn with_generators(
        generators: impl IntoIterator<Item = ValueGenerator>,
        index_source: Box<dyn IndexSource>,
    ) -> Self {
        let registry = Self::new(index_source);
        for generator in generators {
            registry.register(generator);
        }
        registry
    }

    /// Append a generator
    pub fn register(&self, generator: impl Into<ValueGenerator>) {
        let generator = generator.into();
        tracing::debug!(generator = generator.name(), "Registering generator");
        self.generators
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(Arc::new(generator));
    }

    /// Pick one registered generator uniformly at random
    pub fn pick_random(&self) -> Result<Arc<ValueGenerator>, RegistryError> {
        let generators = self.generators.read().unwrap_or_else(|e| e.into_inner());
        if generators.is_empty() {
            return Err(RegistryError::NoGeneratorsAvailable);
        }

        let index = self
            .index_source
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .next_index(generators.len());

        // A misbehaving source still yields a valid index.
        Ok(generators[index % generators.len()].clone())
    }

    /// First generator registered under `name`
    pub fn pick_by_name(&self, name: &str) -> Result<Arc<ValueGenerator>, RegistryError> {
        self.generators
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .find(|g| g.name() == name)
            .cloned()
            .ok_or_else(|| RegistryError::GeneratorNotFound(name.to_string()))
    }

    /// Names in registration order
    pub fn names(&self) -> Vec<&'static str> {
        self.generators
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|g| g.name())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.generators.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for GeneratorRegistry {
    fn default() -> Self {
        Self::new(Box::new(SeededIndexSource::new()))
    }
}
