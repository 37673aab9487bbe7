//! Health Check Handler

use axum::{extract::State, Json};
use chrono::Utc;
use std::sync::Arc;

use crate::dto::HealthResponse;
use crate::state::AppState;

/// `GET /health`
///
/// Liveness only; reports trade feed counters without touching storage.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now().timestamp_millis(),
        feed: state.feed.stats(),
        queued_events: state.feed.queued(),
    })
}
