use super::normalized_span;
use crate::errors::GeneratorError;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::{
    sync::Mutex,
    time::{SystemTime, UNIX_EPOCH},
};

/// Fast pseudo-random generator.
///
/// Seeded once from the clock; predictable to anyone who can guess the seed.
#[derive(Debug)]
pub struct UniformGenerator {
    source: Mutex<StdRng>,
}

impl UniformGenerator {
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
            source: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Draw an integer in `[min, max]`, swapping reversed bounds
    pub fn draw(&self, min: i64, max: i64) -> Result<i64, GeneratorError> {
        let (lo, hi, _) = normalized_span(min, max)?;

        let mut source = self.source.lock().unwrap_or_else(|e| e.into_inner());
        Ok(source.gen_range(lo..=hi))
    }
}

impl Default for UniformGenerator {
    fn default() -> Self {
        Self::new()
    }
}
