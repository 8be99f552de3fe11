//! Random value generation strategies
//!
//! [`ValueGenerator`] is a closed set of strategies. Only the commit-reveal arm
//! can disclose commit material for later verification.

pub mod commit_reveal;
pub mod secure;
pub mod uniform;

pub use commit_reveal::{CommitRevealGenerator, SeedSource};
pub use secure::SecureUniformGenerator;
pub use uniform::UniformGenerator;

use crate::{
    errors::{DrawStage, FairDiceError, GeneratorError},
    games::types::GeneratorKind,
};

/// Both values of a round plus the commit material, when the strategy has any
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundDraw {
    pub player_value: i64,
    pub house_value: i64,
    pub disclosure: Option<String>,
}

/// A random value generation strategy
#[derive(Debug)]
pub enum ValueGenerator {
    Uniform(UniformGenerator),
    SecureUniform(SecureUniformGenerator),
    CommitReveal(CommitRevealGenerator),
}

impl ValueGenerator {
    /// Draw an integer in `[min, max]`
    pub fn draw(&self, min: i64, max: i64) -> Result<i64, GeneratorError> {
        match self {
            ValueGenerator::Uniform(g) => g.draw(min, max),
            ValueGenerator::SecureUniform(g) => g.draw(min, max),
            ValueGenerator::CommitReveal(g) => g.draw(min, max),
        }
    }

    pub fn kind(&self) -> GeneratorKind {
        match self {
            ValueGenerator::Uniform(_) => GeneratorKind::Uniform,
            ValueGenerator::SecureUniform(_) => GeneratorKind::SecureUniform,
            ValueGenerator::CommitReveal(_) => GeneratorKind::CommitReveal,
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind().as_str()
    }

    /// Disclosure capability, present only for commit-reveal generators
    pub fn as_commit_reveal(&self) -> Option<&CommitRevealGenerator> {
        match self {
            ValueGenerator::CommitReveal(g) => Some(g),
            _ => None,
        }
    }

    /// Commit material for the most recent draw, if this strategy supports it
    pub fn disclose(&self) -> Option<String> {
        self.as_commit_reveal().map(CommitRevealGenerator::disclose)
    }

    /// Player draw, house draw and disclosure for one round.
    ///
    /// A commit-reveal round holds the counter lock throughout, so rounds
    /// sharing the instance never interleave their draws.
    pub fn draw_round(&self, min: i64, max: i64) -> Result<RoundDraw, FairDiceError> {
        if let ValueGenerator::CommitReveal(g) = self {
            // Only the bounds check can fail, and it runs before the player draw
            let (player_value, house_value, disclosure) =
                g.draw_round(min, max).map_err(|source| FairDiceError::Draw {
                    stage: DrawStage::Player,
                    source,
                })?;
            return Ok(RoundDraw {
                player_value,
                house_value,
                disclosure: Some(disclosure),
            });
        }

        let player_value = self.draw(min, max).map_err(|source| FairDiceError::Draw {
            stage: DrawStage::Player,
            source,
        })?;
        let house_value = self.draw(min, max).map_err(|source| FairDiceError::Draw {
            stage: DrawStage::House,
            source,
        })?;

        Ok(RoundDraw {
            player_value,
            house_value,
            disclosure: None,
        })
    }
}

impl From<UniformGenerator> for ValueGenerator {
    fn from(g: UniformGenerator) -> Self {
        ValueGenerator::Uniform(g)
    }
}

impl From<SecureUniformGenerator> for ValueGenerator {
    fn from(g: SecureUniformGenerator) -> Self {
        ValueGenerator::SecureUniform(g)
    }
}

impl From<CommitRevealGenerator> for ValueGenerator {
    fn from(g: CommitRevealGenerator) -> Self {
        ValueGenerator::CommitReveal(g)
    }
}

/// Swap reversed bounds; returns `(lo, hi, span)` where span counts the values.
///
/// Fails with `RangeError` when the range holds more values than fit in a `u64`.
pub(crate) fn normalized_span(min: i64, max: i64) -> Result<(i64, i64, u64), GeneratorError> {
    let (lo, hi) = if min > max { (max, min) } else { (min, max) };
    let span = i128::from(hi) - i128::from(lo) + 1;
    let span = u64::try_from(span).map_err(|_| GeneratorError::RangeError { min, max })?;
    Ok((lo, hi, span))
}
