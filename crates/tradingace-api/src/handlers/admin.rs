//! Admin Handlers
//!
//! Operator endpoints: share-pool distribution and event replay. These are
//! only mounted when enabled in [`crate::ApiConfig`].

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::info;

use tradingace_engine::DistributionReport;
use tradingace_types::TaskId;

use crate::dto::{SubmitEventRequest, SubmitEventResponse};
use crate::error::ApiResult;
use crate::state::AppState;

/// `POST /admin/tasks/:task_id/distribute`
pub async fn distribute_share_pool(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<i64>,
) -> ApiResult<Json<DistributionReport>> {
    info!(task_id, "Share-pool distribution requested");
    let report = state.service.distribute_share_pool(TaskId(task_id)).await?;
    Ok(Json(report))
}

/// `POST /admin/events` - queue one swap for processing
pub async fn submit_event(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SubmitEventRequest>,
) -> ApiResult<(StatusCode, Json<SubmitEventResponse>)> {
    let event = request.into_event()?;
    let response = SubmitEventResponse {
        queued: true,
        user_id: event.user(),
        tx_hash: event.tx_hash,
    };

    state.feed.submit(event).await?;
    Ok((StatusCode::ACCEPTED, Json(response)))
}
