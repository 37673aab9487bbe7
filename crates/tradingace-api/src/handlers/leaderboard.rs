//! Leaderboard Handler

use axum::{extract::State, Json};
use std::sync::Arc;

use tradingace_types::UserRanking;

use crate::error::ApiResult;
use crate::state::AppState;

/// `GET /api/v1/leaderboard`
pub async fn get_leaderboard(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<UserRanking>>> {
    let ranking = state.service.get_leaderboard().await?;
    Ok(Json(ranking))
}
