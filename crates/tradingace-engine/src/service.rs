//! Campaign service
//!
//! Entry point for every engine operation. The operations themselves are
//! implemented next to their logic in [`crate::completion`],
//! [`crate::distributor`] and [`crate::leaderboard`].

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use tradingace_types::{
    Campaign, CampaignError, CampaignResult, RewardRules, Task, UserAddress, UserTask,
};

use crate::store::{CampaignStore, TaskStore, UserTaskStore};

/// The active campaign with its tasks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveCampaign {
    pub campaign: Campaign,
    pub tasks: Vec<Task>,
}

/// Campaign reward engine
pub struct CampaignService {
    pub(crate) campaigns: Arc<dyn CampaignStore>,
    pub(crate) tasks: Arc<dyn TaskStore>,
    pub(crate) user_tasks: Arc<dyn UserTaskStore>,
    pub(crate) rules: RewardRules,
}

impl CampaignService {
    pub fn new(
        campaigns: Arc<dyn CampaignStore>,
        tasks: Arc<dyn TaskStore>,
        user_tasks: Arc<dyn UserTaskStore>,
        rules: RewardRules,
    ) -> Self {
        Self {
            campaigns,
            tasks,
            user_tasks,
            rules,
        }
    }

    /// Reward rules in effect
    pub fn rules(&self) -> &RewardRules {
        &self.rules
    }

    /// Resolve the campaign active right now.
    ///
    /// Always queried, never cached, so campaign boundaries take effect on
    /// the next call.
    pub(crate) async fn resolve_active_campaign(&self) -> CampaignResult<Option<Campaign>> {
        self.campaigns.get_active_campaign(Utc::now()).await
    }

    /// The active campaign and its tasks
    pub async fn get_active_campaign(&self) -> CampaignResult<ActiveCampaign> {
        let campaign = self
            .resolve_active_campaign()
            .await?
            .ok_or(CampaignError::NoActiveCampaign)?;
        let tasks = self.tasks.get_tasks_by_campaign(campaign.id).await?;
        Ok(ActiveCampaign { campaign, tasks })
    }

    /// Every task record of a user, ordered by task id
    pub async fn get_user_task_status(&self, user: &UserAddress) -> CampaignResult<Vec<UserTask>> {
        let mut records = self.user_tasks.get_user_tasks(user).await?;
        records.sort_by_key(|r| r.task_id);
        debug!(user = %user, count = records.len(), "Loaded user tasks");
        Ok(records)
    }

    /// Every task record of a user, most recently updated first
    pub async fn get_user_points_history(
        &self,
        user: &UserAddress,
    ) -> CampaignResult<Vec<UserTask>> {
        let mut records = self.user_tasks.get_user_tasks(user).await?;
        records.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(a.task_id.cmp(&b.task_id)));
        Ok(records)
    }
}
