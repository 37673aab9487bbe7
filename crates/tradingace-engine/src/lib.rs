//! TradingAce Engine - Campaign reward logic
//!
//! Converts trade events into campaign points and ranks users.
//!
//! # Components
//!
//! - **Normalizer**: raw swap legs to a decimal amount in the reference unit
//! - **Task Completion**: per-event merge into each task's `UserTask`
//! - **Share-Pool Distribution**: proportional split of a task's point pool
//! - **Leaderboard**: dense-ranked point totals for the active campaign
//! - **Trade Feed**: sharded queue that serializes events per user
//!
//! All persistence goes through the traits in [`store`]. The engine never
//! retries internally; every operation is safe to retry.
//!
//! # Example
//!
//! ```ignore
//! use tradingace_engine::{CampaignService, InMemoryStore};
//!
//! let store = Arc::new(InMemoryStore::new());
//! let service = CampaignService::new(store.clone(), store.clone(), store, RewardRules::default());
//!
//! service.on_trade_event(&event).await?;
//! let report = service.distribute_share_pool(task_id).await?;
//! let leaderboard = service.get_leaderboard().await?;
//! ```

pub mod store;
pub mod memory;
pub mod normalizer;
pub mod service;
pub mod completion;
pub mod distributor;
pub mod leaderboard;
pub mod feed;

#[cfg(test)]
mod testing;

pub use store::{CampaignStore, TaskStore, UserTaskStore};
pub use memory::InMemoryStore;
pub use normalizer::normalize_trade_amount;
pub use service::{ActiveCampaign, CampaignService};
pub use completion::TradeOutcome;
pub use distributor::{DistributionReport, ShareAward};
pub use leaderboard::dense_rank;
pub use feed::{FeedConfig, FeedHandle, FeedStats, FeedStatsSnapshot, TradeFeed};

pub use tradingace_types as types;
