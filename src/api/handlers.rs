//! Request Handlers

use super::{errors::ApiError, middleware::RequestId, models::*};
use crate::{game_store::clamp_limit, games::types::Outcome, services::DiceGameService};
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::header,
    response::IntoResponse,
    Extension, Json,
};
use std::sync::Arc;

/// Shared application state
pub struct AppState {
    pub service: Arc<DiceGameService>,
    pub version: String,
}

impl AppState {
    pub fn new(service: Arc<DiceGameService>) -> Self {
        Self {
            service,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// GET /health
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: state.version.clone(),
    })
}

/// POST /api/play
pub async fn play_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    body: Option<Json<PlayRequest>>,
) -> Result<Json<Outcome>, ApiError> {
    let player_id = body
        .and_then(|Json(req)| req.player_id)
        .unwrap_or_default();

    let outcome = state
        .service
        .play(&player_id)
        .await
        .map_err(|e| ApiError::from_service(request_id.0.clone(), e))?;

    Ok(Json(outcome))
}

/// POST /api/verify
pub async fn verify_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    body: Result<Json<VerifyRequest>, JsonRejection>,
) -> Result<Json<VerifyResponse>, ApiError> {
    let Json(req) = body.map_err(|rejection| {
        ApiError::bad_request(request_id.0.clone(), rejection.body_text())
    })?;

    if req.round_id.is_empty() {
        return Err(ApiError::bad_request(
            request_id.0,
            "round_id is required".to_string(),
        ));
    }

    let is_valid = state
        .service
        .verify(&req.round_id, &req.client_seed)
        .await
        .map_err(|e| ApiError::from_service(request_id.0.clone(), e))?;

    Ok(Json(VerifyResponse {
        round_id: req.round_id,
        is_valid,
    }))
}

/// GET /api/rounds/:round_id
pub async fn round_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    Path(round_id): Path<String>,
) -> Result<Json<Outcome>, ApiError> {
    state
        .service
        .get_outcome(&round_id)
        .await
        .map(Json)
        .map_err(|e| ApiError::from_service(request_id.0, e))
}

/// GET /api/players/:player_id/rounds?limit={n}&offset={n}
pub async fn player_rounds_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    Path(player_id): Path<String>,
    Query(params): Query<HistoryQuery>,
) -> Result<Json<PlayerRoundsResponse>, ApiError> {
    let limit = clamp_limit(params.limit);
    let offset = params.offset.unwrap_or(0);

    let rounds = state
        .service
        .outcomes_by_player(&player_id, Some(limit), Some(offset))
        .await
        .map_err(|e| ApiError::from_service(request_id.0.clone(), e))?;

    Ok(Json(PlayerRoundsResponse {
        player_id,
        pagination: PaginationInfo {
            limit,
            offset,
            total_returned: rounds.len(),
        },
        rounds,
    }))
}

/// GET /api/stats
pub async fn stats_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatsResponse>, ApiError> {
    let total_rounds = state
        .service
        .total_rounds()
        .await
        .map_err(|e| ApiError::from_service(request_id.0.clone(), e))?;

    Ok(Json(StatsResponse {
        total_rounds,
        generators: state
            .service
            .generator_names()
            .into_iter()
            .map(str::to_string)
            .collect(),
    }))
}

/// GET /metrics (Prometheus text format)
pub async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        state.service.metrics().render(),
    )
}
