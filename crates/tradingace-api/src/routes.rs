//! API Routes

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::handlers;
use crate::state::AppState;

/// Public API v1 routes
pub fn api_v1_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users/:address/tasks", get(handlers::users::get_user_tasks))
        .route(
            "/users/:address/points/history",
            get(handlers::users::get_points_history),
        )
        .route("/leaderboard", get(handlers::leaderboard::get_leaderboard))
        .route("/campaign", get(handlers::campaign::get_active_campaign))
}

/// Operator routes
pub fn admin_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/tasks/:task_id/distribute",
            post(handlers::admin::distribute_share_pool),
        )
        .route("/events", post(handlers::admin::submit_event))
}
