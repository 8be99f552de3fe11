//! API Request and Response Models
//!
//! Round outcomes are returned as [`Outcome`] JSON directly.

use crate::games::types::Outcome;
use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// POST /api/play body; the body itself is optional
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayRequest {
    #[serde(default)]
    pub player_id: Option<String>,
}

/// POST /api/verify body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyRequest {
    pub round_id: String,
    pub client_seed: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub round_id: String,
    pub is_valid: bool,
}

/// Player history query parameters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryQuery {
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub offset: Option<usize>,
}

/// Player history response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerRoundsResponse {
    pub player_id: String,
    pub rounds: Vec<Outcome>,
    pub pagination: PaginationInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationInfo {
    pub limit: usize,
    pub offset: usize,
    pub total_returned: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
    pub total_rounds: u64,
    pub generators: Vec<String>,
}
