//! Engine store traits backed by PostgreSQL

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use tradingace_engine::{CampaignStore, TaskStore, UserTaskStore};
use tradingace_types::{
    Campaign, CampaignId, CampaignResult, Task, TaskId, UserAddress, UserPoints, UserTask,
    UserTaskMerge, UserVolume,
};

use crate::error::DbError;
use crate::repos::{CampaignRepo, TaskRepo, UserTaskRepo};

/// PostgreSQL implementation of every engine store
pub struct PgStore {
    campaigns: CampaignRepo,
    tasks: TaskRepo,
    user_tasks: UserTaskRepo,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            campaigns: CampaignRepo::new(pool.clone()),
            tasks: TaskRepo::new(pool.clone()),
            user_tasks: UserTaskRepo::new(pool),
        }
    }
}

fn convert_all<R, T>(rows: Vec<R>) -> Result<Vec<T>, DbError>
where
    T: TryFrom<R, Error = DbError>,
{
    rows.into_iter().map(T::try_from).collect()
}

#[async_trait]
impl CampaignStore for PgStore {
    async fn get_active_campaign(&self, now: DateTime<Utc>) -> CampaignResult<Option<Campaign>> {
        let row = self.campaigns.find_active(now).await?;
        Ok(row.map(Campaign::try_from).transpose()?)
    }
}

#[async_trait]
impl TaskStore for PgStore {
    async fn get_tasks_by_campaign(&self, campaign_id: CampaignId) -> CampaignResult<Vec<Task>> {
        let rows = self.tasks.find_by_campaign(campaign_id.get()).await?;
        Ok(convert_all(rows)?)
    }

    async fn get_task(&self, task_id: TaskId) -> CampaignResult<Option<Task>> {
        let row = self.tasks.find_by_id(task_id.get()).await?;
        Ok(row.map(Task::try_from).transpose()?)
    }
}

#[async_trait]
impl UserTaskStore for PgStore {
    async fn merge_user_tasks(&self, merges: &[UserTaskMerge]) -> CampaignResult<Vec<UserTask>> {
        let rows = self.user_tasks.merge_all(merges).await?;
        Ok(convert_all(rows)?)
    }

    async fn get_user_tasks(&self, user: &UserAddress) -> CampaignResult<Vec<UserTask>> {
        let rows = self.user_tasks.find_by_user(user.as_str()).await?;
        Ok(convert_all(rows)?)
    }

    async fn get_user_volumes(&self, task_id: TaskId) -> CampaignResult<Vec<UserVolume>> {
        let rows = self.user_tasks.volumes_by_task(task_id.get()).await?;
        Ok(rows.into_iter().map(UserVolume::from).collect())
    }

    async fn has_completed_task(
        &self,
        user: &UserAddress,
        within: Option<&[TaskId]>,
    ) -> CampaignResult<bool> {
        let task_ids = within.map(|ids| ids.iter().map(TaskId::get).collect::<Vec<_>>());
        Ok(self.user_tasks.has_completed(user.as_str(), task_ids).await?)
    }

    async fn award_points(
        &self,
        task_id: TaskId,
        user: &UserAddress,
        points: i64,
        at: DateTime<Utc>,
    ) -> CampaignResult<bool> {
        Ok(self
            .user_tasks
            .award(task_id.get(), user.as_str(), points, at)
            .await?)
    }

    async fn get_user_points(&self, task_ids: &[TaskId]) -> CampaignResult<Vec<UserPoints>> {
        let ids: Vec<i64> = task_ids.iter().map(TaskId::get).collect();
        let rows = self.user_tasks.points_by_user(&ids).await?;
        Ok(rows.into_iter().map(UserPoints::from).collect())
    }
}
