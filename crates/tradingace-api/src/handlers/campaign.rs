//! Campaign Handler

use axum::{extract::State, Json};
use std::sync::Arc;

use tradingace_engine::ActiveCampaign;

use crate::error::ApiResult;
use crate::state::AppState;

/// `GET /api/v1/campaign` - the active campaign and its tasks
pub async fn get_active_campaign(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<ActiveCampaign>> {
    let active = state.service.get_active_campaign().await?;
    Ok(Json(active))
}
