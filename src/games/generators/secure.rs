use super::normalized_span;
use crate::errors::GeneratorError;
use rand_core::{OsRng, RngCore};

/// Generator backed by the operating system's CSPRNG.
///
/// Uses rejection sampling over 64-bit words so every value in the range is
/// equally likely.
#[derive(Debug, Default)]
pub struct SecureUniformGenerator;

impl SecureUniformGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Draw an integer in `[min, max]`, swapping reversed bounds
    pub fn draw(&self, min: i64, max: i64) -> Result<i64, GeneratorError> {
        let (lo, _, span) = normalized_span(min, max)?;
        let offset = sample_below(span)?;
        Ok((i128::from(lo) + i128::from(offset)) as i64)
    }
}

/// Uniform integer in `[0, span)`
fn sample_below(span: u64) -> Result<u64, GeneratorError> {
    // Largest multiple of `span` that fits; words at or above it are rejected.
    let zone = (u64::MAX / span) * span;
    loop {
        let word = next_word()?;
        if word < zone {
            return Ok(word % span);
        }
    }
}

fn next_word() -> Result<u64, GeneratorError> {
    let mut buf = [0u8; 8];
    OsRng
        .try_fill_bytes(&mut buf)
        .map_err(|e| GeneratorError::Entropy(e.to_string()))?;
    Ok(u64::from_le_bytes(buf))
}
