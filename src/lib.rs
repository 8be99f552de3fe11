//! Fairdice - provably fair two-party dice game
//!
//! Each round picks a random value generator, draws a die for the player and
//! one for the house, decides the winner and stores the outcome. Rounds played
//! with the commit-reveal generator carry disclosure data that can be checked
//! later through the verification engine.

pub mod api;
pub mod config;
pub mod errors;
pub mod fairness;
pub mod game_store;
pub mod games;
pub mod logging;
pub mod metrics;
pub mod services;
pub mod storage;

pub use config::{AppConfig, ConfigLoader};
pub use errors::{FairDiceError, FairDiceResult};
pub use games::types::{Outcome, RoundResult};
pub use services::{DiceGameService, ServiceBuilder};
