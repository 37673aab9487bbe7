//! User Handlers
//!
//! Per-user task progress, keyed by chain address.

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use tradingace_types::{UserAddress, UserTask};

use crate::error::ApiResult;
use crate::state::AppState;

/// `GET /api/v1/users/:address/tasks`
///
/// Every task record of the user, ordered by task id. Unknown users get an
/// empty list.
pub async fn get_user_tasks(
    State(state): State<Arc<AppState>>,
    Path(address): Path<String>,
) -> ApiResult<Json<Vec<UserTask>>> {
    let user = UserAddress::parse(&address)?;
    let tasks = state.service.get_user_task_status(&user).await?;
    Ok(Json(tasks))
}

/// `GET /api/v1/users/:address/points/history`
///
/// The same records, most recently updated first.
pub async fn get_points_history(
    State(state): State<Arc<AppState>>,
    Path(address): Path<String>,
) -> ApiResult<Json<Vec<UserTask>>> {
    let user = UserAddress::parse(&address)?;
    let history = state.service.get_user_points_history(&user).await?;
    Ok(Json(history))
}
