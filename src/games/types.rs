use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Player id substituted when a caller plays without one
pub const ANONYMOUS_PLAYER: &str = "anonymous";

/// Lowest face of a die
pub const DIE_MIN: i64 = 1;

/// Highest face of a die
pub const DIE_MAX: i64 = 6;

/// Random value generation strategies
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum GeneratorKind {
    Uniform,
    SecureUniform,
    CommitReveal,
}

impl GeneratorKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            GeneratorKind::Uniform => "uniform",
            GeneratorKind::SecureUniform => "secure_uniform",
            GeneratorKind::CommitReveal => "commit_reveal",
        }
    }
}

impl fmt::Display for GeneratorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who won a round
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RoundResult {
    PlayerWins,
    HouseWins,
    Draw,
}

impl RoundResult {
    /// Higher value wins; equal values draw
    pub fn decide(player_value: i64, house_value: i64) -> Self {
        match player_value.cmp(&house_value) {
            std::cmp::Ordering::Greater => RoundResult::PlayerWins,
            std::cmp::Ordering::Less => RoundResult::HouseWins,
            std::cmp::Ordering::Equal => RoundResult::Draw,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            RoundResult::PlayerWins => "player_wins",
            RoundResult::HouseWins => "house_wins",
            RoundResult::Draw => "draw",
        }
    }
}

impl fmt::Display for RoundResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable record of one played round
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Outcome {
    pub round_id: String,
    pub player_id: String,
    pub player_value: i64,
    pub house_value: i64,
    pub result: RoundResult,
    pub created_at: DateTime<Utc>,
    pub generator_name: String,
    /// Commit material; present only for commit-reveal rounds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disclosure: Option<String>,
}

impl Outcome {
    /// Assemble a new outcome with a fresh round id
    pub fn new(
        player_id: String,
        player_value: i64,
        house_value: i64,
        generator_name: impl Into<String>,
        disclosure: Option<String>,
    ) -> Self {
        Self {
            round_id: Uuid::new_v4().to_string(),
            player_id,
            player_value,
            house_value,
            result: RoundResult::decide(player_value, house_value),
            created_at: Utc::now(),
            generator_name: generator_name.into(),
            disclosure: disclosure.filter(|d| !d.is_empty()),
        }
    }
}
