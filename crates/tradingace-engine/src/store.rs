//! Storage traits
//!
//! The engine talks to persistence only through these traits. Implementations
//! must enforce the merge-or-freeze rule atomically on their side; the engine
//! never does a read-modify-write on a `UserTask`.
//!
//! Cancellation follows the caller: dropping an engine future drops the
//! in-flight storage future with it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use tradingace_types::{
    Campaign, CampaignId, CampaignResult, Task, TaskId, UserAddress, UserPoints, UserTask,
    UserTaskMerge, UserVolume,
};

/// Campaign lookups
#[async_trait]
pub trait CampaignStore: Send + Sync {
    /// The campaign whose window contains `now`. If several overlap, the one
    /// that started last.
    async fn get_active_campaign(&self, now: DateTime<Utc>) -> CampaignResult<Option<Campaign>>;
}

/// Task lookups
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// All tasks of a campaign, ordered by id
    async fn get_tasks_by_campaign(&self, campaign_id: CampaignId) -> CampaignResult<Vec<Task>>;

    /// One task by id
    async fn get_task(&self, task_id: TaskId) -> CampaignResult<Option<Task>>;
}

/// User task records
#[async_trait]
pub trait UserTaskStore: Send + Sync {
    /// Apply all merges of one event atomically: either every record is
    /// updated or none is. Returns the post-merge records.
    async fn merge_user_tasks(&self, merges: &[UserTaskMerge]) -> CampaignResult<Vec<UserTask>>;

    /// All records of a user, ordered by task id
    async fn get_user_tasks(&self, user: &UserAddress) -> CampaignResult<Vec<UserTask>>;

    /// Cumulative amount per user for one task
    async fn get_user_volumes(&self, task_id: TaskId) -> CampaignResult<Vec<UserVolume>>;

    /// Whether the user has any completed record, optionally restricted to
    /// the given tasks
    async fn has_completed_task(
        &self,
        user: &UserAddress,
        within: Option<&[TaskId]>,
    ) -> CampaignResult<bool>;

    /// Mark the record completed with `points`, overwriting prior status and
    /// points. Returns `false` when the record already held exactly that
    /// state and nothing was written.
    async fn award_points(
        &self,
        task_id: TaskId,
        user: &UserAddress,
        points: i64,
        at: DateTime<Utc>,
    ) -> CampaignResult<bool>;

    /// Point totals of completed records per user over the given tasks
    async fn get_user_points(&self, task_ids: &[TaskId]) -> CampaignResult<Vec<UserPoints>>;
}
