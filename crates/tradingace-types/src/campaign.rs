//! Campaigns and tasks
//!
//! A campaign is a reward period; it owns zero or more tasks. Both are
//! created by an operator workflow and only read by the engine.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::{CampaignId, TaskId};

/// Campaign lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    /// Not started yet
    Upcoming,
    /// Running
    Active,
    /// Finished
    Ended,
}

impl CampaignStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upcoming => "upcoming",
            Self::Active => "active",
            Self::Ended => "ended",
        }
    }
}

impl fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CampaignStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "upcoming" => Ok(Self::Upcoming),
            "active" => Ok(Self::Active),
            "ended" => Ok(Self::Ended),
            other => Err(format!("unknown campaign status: {}", other)),
        }
    }
}

/// A time-boxed reward period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: CampaignId,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Operator-maintained status; the time window is authoritative for
    /// deciding which campaign is active.
    pub status: CampaignStatus,
}

impl Campaign {
    /// Whether `now` falls inside `[start_time, end_time)`
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.start_time <= now && now < self.end_time
    }

    /// Status derived from the time window
    pub fn status_at(&self, now: DateTime<Utc>) -> CampaignStatus {
        if now < self.start_time {
            CampaignStatus::Upcoming
        } else if now < self.end_time {
            CampaignStatus::Active
        } else {
            CampaignStatus::Ended
        }
    }
}

/// Task type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    /// Completed once by crossing a cumulative amount threshold
    Onboarding,
    /// Fixed point pool split proportionally by volume after the task ends
    SharePool,
}

impl TaskType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Onboarding => "onboarding",
            Self::SharePool => "share_pool",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "onboarding" => Ok(Self::Onboarding),
            "share_pool" => Ok(Self::SharePool),
            other => Err(format!("unknown task type: {}", other)),
        }
    }
}

/// A reward-earning activity scoped to one campaign
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub campaign_id: CampaignId,
    pub task_type: TaskType,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Pool the task's volume is attributed to
    pub pool_address: String,
    /// Point budget; only meaningful for share-pool tasks
    pub points_pool: i64,
}

impl Task {
    pub fn is_share_pool(&self) -> bool {
        self.task_type == TaskType::SharePool
    }

    pub fn has_ended_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.end_time
    }
}
