//! TradingAce Types - Domain model for the campaign reward engine
//!
//! This crate holds the foundational types shared by every other tradingace
//! crate:
//!
//! - Identity types (`CampaignId`, `TaskId`, `UserTaskId`, `UserAddress`)
//! - Campaigns and their tasks (`Campaign`, `Task`, `TaskType`)
//! - Per-user progress (`UserTask`, `TaskStatus`) and the merge-or-freeze rule
//! - Read projections (`UserVolume`, `UserPoints`, `UserRanking`)
//! - Decoded trade events (`SwapEvent`)
//! - Reward configuration (`RewardRules`)
//! - The structured error taxonomy (`CampaignError`)
//!
//! # Invariants
//!
//! 1. A completed `UserTask` never changes status or points through a merge
//! 2. Merged amounts are additive, including after completion
//! 3. User identifiers are lower-case `0x`-prefixed hex addresses

pub mod identity;
pub mod campaign;
pub mod user_task;
pub mod event;
pub mod rules;
pub mod error;

pub use identity::*;
pub use campaign::*;
pub use user_task::*;
pub use event::*;
pub use rules::*;
pub use error::*;
