//! Application state shared across handlers

use std::sync::Arc;

use tradingace_engine::{CampaignService, FeedHandle};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Campaign reward engine
    pub service: Arc<CampaignService>,
    /// Submission side of the trade feed
    pub feed: FeedHandle,
}

impl AppState {
    pub fn new(service: Arc<CampaignService>, feed: FeedHandle) -> Self {
        Self { service, feed }
    }
}
