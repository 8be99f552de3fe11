//! Route Definitions

use super::handlers::*;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Build the API router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        // Game endpoints
        .route("/api/play", post(play_handler))
        .route("/api/verify", post(verify_handler))
        .route("/api/rounds/:round_id", get(round_handler))
        .route("/api/players/:player_id/rounds", get(player_rounds_handler))
        .route("/api/stats", get(stats_handler))
        // Prometheus scrape endpoint
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}
