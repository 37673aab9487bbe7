//! Task completion
//!
//! Every trade event is merged into one `UserTask` per task of the active
//! campaign. Onboarding tasks complete when the cumulative amount reaches
//! the threshold; share-pool tasks only accumulate until distribution.

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info};

use tradingace_types::{
    CampaignId, CampaignResult, SwapEvent, TaskStatus, TaskType, UserTask, UserTaskMerge,
};

use crate::normalizer::normalize_trade_amount;
use crate::service::CampaignService;

/// Result of processing one trade event
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TradeOutcome {
    /// Nothing to reward: no campaign is active
    NoActiveCampaign,
    /// Merges were persisted
    Applied {
        campaign_id: CampaignId,
        amount: Decimal,
        records: Vec<UserTask>,
    },
}

impl CampaignService {
    /// Merge a trade event into the sender's task records.
    ///
    /// All merges of the event are persisted atomically; a storage error
    /// means none were applied and the event may be retried.
    pub async fn on_trade_event(&self, event: &SwapEvent) -> CampaignResult<TradeOutcome> {
        let Some(campaign) = self.resolve_active_campaign().await? else {
            debug!(tx = %event.tx_hash, "No active campaign, skipping trade event");
            return Ok(TradeOutcome::NoActiveCampaign);
        };

        let tasks = self.tasks.get_tasks_by_campaign(campaign.id).await?;
        let amount = normalize_trade_amount(event, &self.rules)?;
        let user = event.user();
        let now = Utc::now();

        let merges: Vec<UserTaskMerge> = tasks
            .iter()
            .map(|task| UserTaskMerge {
                user_id: user.clone(),
                task_id: task.id,
                amount,
                completion: match task.task_type {
                    TaskType::Onboarding => Some(self.rules.onboarding_rule()),
                    TaskType::SharePool => None,
                },
                updated_at: now,
            })
            .collect();

        let records = if merges.is_empty() {
            Vec::new()
        } else {
            self.user_tasks.merge_user_tasks(&merges).await?
        };

        for record in records.iter().filter(|r| r.status == TaskStatus::Completed) {
            debug!(
                user = %record.user_id,
                task_id = %record.task_id,
                points = record.points,
                "Task record completed"
            );
        }

        info!(
            user = %user,
            campaign_id = %campaign.id,
            amount = %amount,
            block = event.block_number,
            tasks = records.len(),
            "Processed trade event"
        );

        Ok(TradeOutcome::Applied {
            campaign_id: campaign.id,
            amount,
            records,
        })
    }
}
