//! # Health Check Handlers

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::hearings::GuardStats;
use crate::messaging::QueueMetrics;
use crate::web::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub environment: String,
    pub registered_handlers: usize,
    pub version_guard: GuardStats,
    pub hearing_queue: QueueMetrics,
}

/// Basic health check endpoint: GET /health
pub async fn basic_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        environment: state.config.environment().to_string(),
        registered_handlers: state.dispatcher.registry().len(),
        version_guard: state.guard.stats(),
        hearing_queue: state.hearing_queue.metrics().await,
    })
}
