//! Request and response bodies that are not plain domain types

use alloy_primitives::{Bytes, B256};
use serde::{Deserialize, Serialize};

use tradingace_engine::FeedStatsSnapshot;
use tradingace_types::{CampaignResult, SwapEvent, UserAddress};

/// A raw `Swap` log as delivered by a node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSwapLog {
    pub topics: Vec<B256>,
    pub data: Bytes,
    pub block_number: u64,
    pub tx_hash: B256,
}

/// Body of `POST /admin/events`: either a raw log or an already decoded event
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubmitEventRequest {
    Raw(RawSwapLog),
    Decoded(SwapEvent),
}

impl SubmitEventRequest {
    pub fn into_event(self) -> CampaignResult<SwapEvent> {
        match self {
            Self::Raw(log) => {
                SwapEvent::from_log(&log.topics, &log.data, log.block_number, log.tx_hash)
            }
            Self::Decoded(event) => Ok(event),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitEventResponse {
    pub queued: bool,
    pub user_id: UserAddress,
    pub tx_hash: B256,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
    pub feed: FeedStatsSnapshot,
    pub queued_events: usize,
}
