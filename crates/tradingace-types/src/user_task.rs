//! Per-user task progress and its read projections
//!
//! `UserTask` is the only mutable record in the system. It changes through
//! two operations:
//!
//! - **merge** (trade events): amount is additive; status and points freeze
//!   once the record is completed
//! - **award** (share-pool distribution): authoritative overwrite of status
//!   and points
//!
//! The merge rule lives here so every store applies exactly the same logic.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{CampaignError, CampaignResult};
use crate::identity::{TaskId, UserAddress, UserTaskId};

/// Progress status of a user on one task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    InProgress,
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            other => Err(format!("unknown task status: {}", other)),
        }
    }
}

/// One user's progress on one task, unique by `(user_id, task_id)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserTask {
    pub id: UserTaskId,
    pub user_id: UserAddress,
    pub task_id: TaskId,
    pub status: TaskStatus,
    /// Cumulative trade amount in the reference unit
    pub amount: Decimal,
    pub points: i64,
    pub updated_at: DateTime<Utc>,
}

/// Threshold rule evaluated against the post-merge cumulative amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRule {
    pub threshold: Decimal,
    pub points: i64,
}

/// An additive update for one `(user, task)` pair
#[derive(Debug, Clone, PartialEq)]
pub struct UserTaskMerge {
    pub user_id: UserAddress,
    pub task_id: TaskId,
    /// Amount added to the cumulative total
    pub amount: Decimal,
    /// Completion rule for this task type, if it completes on-line
    pub completion: Option<CompletionRule>,
    pub updated_at: DateTime<Utc>,
}

impl UserTaskMerge {
    /// Status and points of a record created by this merge alone
    pub fn initial_state(&self) -> (TaskStatus, i64) {
        match self.completion {
            Some(rule) if self.amount >= rule.threshold => (TaskStatus::Completed, rule.points),
            _ => (TaskStatus::InProgress, 0),
        }
    }
}

impl UserTask {
    /// Create the first record for a pair from a merge
    pub fn from_merge(id: UserTaskId, merge: &UserTaskMerge) -> Self {
        let (status, points) = merge.initial_state();
        Self {
            id,
            user_id: merge.user_id.clone(),
            task_id: merge.task_id,
            status,
            amount: merge.amount,
            points,
            updated_at: merge.updated_at,
        }
    }

    /// Apply an additive merge.
    ///
    /// Amount always accumulates. A completed record keeps its status and
    /// points; otherwise the completion rule is checked against the new
    /// cumulative amount. A cumulative amount beyond `Decimal::MAX` is
    /// rejected and leaves the record untouched.
    pub fn apply_merge(&mut self, merge: &UserTaskMerge) -> CampaignResult<()> {
        let amount = self.amount.checked_add(merge.amount).ok_or_else(|| {
            CampaignError::AmountOutOfRange(format!(
                "cumulative amount of {} on task {}",
                self.user_id, self.task_id
            ))
        })?;
        self.amount = amount;
        self.updated_at = merge.updated_at;

        if self.status.is_completed() {
            return Ok(());
        }

        if let Some(rule) = merge.completion {
            if self.amount >= rule.threshold {
                self.status = TaskStatus::Completed;
                self.points = rule.points;
            }
        }
        Ok(())
    }

    /// Authoritatively mark completed with the given points
    pub fn apply_award(&mut self, points: i64, at: DateTime<Utc>) {
        self.status = TaskStatus::Completed;
        self.points = points;
        self.updated_at = at;
    }
}

/// Cumulative amount of one user on one task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserVolume {
    pub user_id: UserAddress,
    pub amount: Decimal,
}

/// Point total of one user across a set of tasks, before ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPoints {
    pub user_id: UserAddress,
    pub total_points: i64,
    /// Most recent update among the counted records
    pub last_updated: DateTime<Utc>,
}

/// A ranked leaderboard row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRanking {
    pub user_id: UserAddress,
    pub total_points: i64,
    /// Dense rank, starting at 1
    pub rank: u32,
    pub updated_at: DateTime<Utc>,
}
