//! Share-pool distribution
//!
//! Splits a share-pool task's fixed point budget among eligible users in
//! proportion to their recorded volume:
//!
//! ```text
//! points = floor(user_volume * points_pool / total_volume)
//! ```
//!
//! Truncation remainders stay unallocated. Awards are written one user at a
//! time; a failed write stops the pass and leaves earlier awards applied.
//! Re-running converges to the same final state, and a re-run with no new
//! volume writes nothing.

use alloy_primitives::U256;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use tradingace_types::{
    CampaignError, CampaignResult, EligibilityScope, Task, TaskId, TaskType, UserAddress,
};

use crate::service::CampaignService;

/// Points awarded to one user
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShareAward {
    pub user_id: UserAddress,
    pub volume: Decimal,
    pub share: Decimal,
    pub points: i64,
}

/// Outcome of one distribution pass
#[derive(Debug, Clone, Serialize)]
pub struct DistributionReport {
    pub task_id: TaskId,
    pub points_pool: i64,
    pub total_volume: Decimal,
    pub awards: Vec<ShareAward>,
    /// Users with volume who failed the eligibility gate
    pub ineligible: Vec<UserAddress>,
    pub points_awarded: i64,
    /// Pool points lost to truncation or to ineligible users
    pub unallocated: i64,
    /// Records actually written in this pass
    pub records_updated: usize,
}

impl CampaignService {
    /// Distribute a share-pool task's point pool.
    ///
    /// Unknown task ids are `TaskNotFound`; onboarding tasks are rejected.
    /// Zero total volume performs no writes.
    pub async fn distribute_share_pool(&self, task_id: TaskId) -> CampaignResult<DistributionReport> {
        let task = self
            .tasks
            .get_task(task_id)
            .await?
            .ok_or(CampaignError::TaskNotFound(task_id))?;

        if !task.is_share_pool() {
            return Err(CampaignError::WrongTaskType {
                task_id,
                expected: TaskType::SharePool.to_string(),
                actual: task.task_type.to_string(),
            });
        }

        let now = Utc::now();
        if !task.has_ended_at(now) {
            warn!(
                task_id = %task_id,
                end_time = %task.end_time,
                "Distributing a share pool before its task has ended"
            );
        }

        let mut volumes = self.user_tasks.get_user_volumes(task_id).await?;
        volumes.retain(|v| v.amount > Decimal::ZERO);
        volumes.sort_by(|a, b| a.user_id.cmp(&b.user_id));

        let total_volume = volumes
            .iter()
            .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(v.amount))
            .ok_or_else(|| {
                CampaignError::AmountOutOfRange(format!("total volume of task {}", task_id))
            })?;

        let mut report = DistributionReport {
            task_id,
            points_pool: task.points_pool,
            total_volume,
            awards: Vec::new(),
            ineligible: Vec::new(),
            points_awarded: 0,
            unallocated: task.points_pool,
            records_updated: 0,
        };

        if total_volume.is_zero() {
            info!(task_id = %task_id, "No volume recorded, nothing to distribute");
            return Ok(report);
        }

        let scope = self.eligibility_task_ids(&task).await?;
        let pool = u64::try_from(task.points_pool).map_err(|_| {
            CampaignError::AmountOutOfRange(format!("points pool {}", task.points_pool))
        })?;

        // Exact integer arithmetic on mantissas at a shared scale
        let scale = volumes.iter().map(|v| v.amount.scale()).max().unwrap_or(0);
        let total_units = volumes
            .iter()
            .try_fold(U256::ZERO, |acc, v| acc.checked_add(scaled_units(v.amount, scale)))
            .ok_or_else(|| {
                CampaignError::AmountOutOfRange(format!("total volume of task {}", task_id))
            })?;

        for volume in volumes {
            let eligible = self
                .user_tasks
                .has_completed_task(&volume.user_id, scope.as_deref())
                .await?;
            if !eligible {
                debug!(user = %volume.user_id, task_id = %task_id, "User not eligible");
                report.ineligible.push(volume.user_id);
                continue;
            }

            let points = pro_rata_points(scaled_units(volume.amount, scale), total_units, pool)
                .ok_or_else(|| {
                    CampaignError::AmountOutOfRange(format!(
                        "share of {} for {}",
                        volume.amount, volume.user_id
                    ))
                })?;

            report.awards.push(ShareAward {
                share: volume.amount / total_volume,
                user_id: volume.user_id,
                volume: volume.amount,
                points,
            });
        }

        for award in &report.awards {
            match self
                .user_tasks
                .award_points(task_id, &award.user_id, award.points, now)
                .await
            {
                Ok(true) => report.records_updated += 1,
                Ok(false) => {}
                Err(e) => {
                    error!(
                        task_id = %task_id,
                        user = %award.user_id,
                        applied = report.records_updated,
                        error = %e,
                        "Share-pool award failed, distribution incomplete"
                    );
                    return Err(e);
                }
            }
        }

        report.points_awarded = report.awards.iter().map(|a| a.points).sum();
        report.unallocated = task.points_pool - report.points_awarded;

        info!(
            task_id = %task_id,
            total_volume = %total_volume,
            awarded = report.points_awarded,
            unallocated = report.unallocated,
            eligible = report.awards.len(),
            ineligible = report.ineligible.len(),
            updated = report.records_updated,
            "Share pool distributed"
        );

        Ok(report)
    }

    /// Tasks that count towards eligibility; `None` means any task anywhere
    async fn eligibility_task_ids(&self, task: &Task) -> CampaignResult<Option<Vec<TaskId>>> {
        match self.rules.eligibility {
            EligibilityScope::Global => Ok(None),
            EligibilityScope::CampaignOnboarding => {
                let ids = self
                    .tasks
                    .get_tasks_by_campaign(task.campaign_id)
                    .await?
                    .into_iter()
                    .filter(|t| t.task_type == TaskType::Onboarding)
                    .map(|t| t.id)
                    .collect();
                Ok(Some(ids))
            }
        }
    }
}

/// A non-negative decimal as an integer count of `10^-scale` units.
///
/// `scale` must be at least the decimal's own scale.
fn scaled_units(amount: Decimal, scale: u32) -> U256 {
    let mantissa = U256::from(amount.mantissa().unsigned_abs());
    let factor = U256::from(10u64).pow(U256::from(scale.saturating_sub(amount.scale())));
    mantissa * factor
}

/// `floor(volume * pool / total)` without intermediate rounding
fn pro_rata_points(volume: U256, total: U256, pool: u64) -> Option<i64> {
    if total.is_zero() {
        return None;
    }
    let points = volume.checked_mul(U256::from(pool))? / total;
    u64::try_from(points).ok().and_then(|p| i64::try_from(p).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;
    use rust_decimal_macros::dec;
    use std::sync::Arc;
    use tradingace_types::{RewardRules, TaskStatus, UserTask};

    /// Seed an eligible user with `volume` on the share-pool task
    async fn seed(store: &crate::InMemoryStore, n: u8, volume: Decimal) {
        store
            .insert_user_task(record(n as i64 * 10, n, ONBOARDING, volume, true, 100))
            .await;
        store
            .insert_user_task(record(n as i64 * 10 + 1, n, SHARE_POOL, volume, false, 0))
            .await;
    }

    async fn share_record(store: &crate::InMemoryStore, n: u8) -> UserTask {
        store
            .all_user_tasks()
            .await
            .into_iter()
            .find(|r| r.user_id == user(n) && r.task_id == SHARE_POOL)
            .unwrap()
    }

    #[tokio::test]
    async fn test_exact_proportional_split() {
        let (store, service) = fixture(1000).await;
        seed(&store, 1, dec!(300)).await;
        seed(&store, 2, dec!(700)).await;

        let report = service.distribute_share_pool(SHARE_POOL).await.unwrap();

        assert_eq!(share_record(&store, 1).await.points, 300);
        assert_eq!(share_record(&store, 2).await.points, 700);
        assert_eq!(share_record(&store, 2).await.status, TaskStatus::Completed);
        assert_eq!(report.points_awarded, 1000);
        assert_eq!(report.unallocated, 0);
    }

    #[tokio::test]
    async fn test_truncation_leaves_remainder_unallocated() {
        let (store, service) = fixture(10).await;
        seed(&store, 1, dec!(1)).await;
        seed(&store, 2, dec!(2)).await;

        let report = service.distribute_share_pool(SHARE_POOL).await.unwrap();

        assert_eq!(share_record(&store, 1).await.points, 3);
        assert_eq!(share_record(&store, 2).await.points, 6);
        assert_eq!(report.points_awarded, 9);
        assert_eq!(report.unallocated, 1);
    }

    #[tokio::test]
    async fn test_floor_is_exact_at_decimal_precision() {
        let (store, service) = fixture(1000).await;
        seed(&store, 1, dec!(49999999999.999999999999999999)).await;
        seed(&store, 2, dec!(0.000000000000000001)).await;

        let report = service.distribute_share_pool(SHARE_POOL).await.unwrap();

        // 1000 * (1 - 2e-29) floors to 999, never rounds up to 1000
        assert_eq!(share_record(&store, 1).await.points, 999);
        assert_eq!(share_record(&store, 2).await.points, 0);
        assert_eq!(report.points_awarded, 999);
        assert_eq!(report.unallocated, 1);
    }

    #[test]
    fn test_pro_rata_mixes_scales() {
        let scale = 6;
        let volume = scaled_units(dec!(1), scale);
        let total = volume + scaled_units(dec!(2.000001), scale);
        // 10 * 1 / 3.000001
        assert_eq!(pro_rata_points(volume, total, 10), Some(3));
        assert_eq!(pro_rata_points(total, total, 10), Some(10));
        assert_eq!(pro_rata_points(volume, U256::ZERO, 10), None);
    }

    #[tokio::test]
    async fn test_ineligible_user_gets_nothing() {
        let (store, service) = fixture(1000).await;
        seed(&store, 1, dec!(500)).await;
        store
            .insert_user_task(record(99, 2, SHARE_POOL, dec!(500), false, 0))
            .await;

        let report = service.distribute_share_pool(SHARE_POOL).await.unwrap();

        assert_eq!(report.ineligible, vec![user(2)]);
        assert_eq!(share_record(&store, 1).await.points, 500);
        let outsider = share_record(&store, 2).await;
        assert_eq!(outsider.status, TaskStatus::InProgress);
        assert_eq!(outsider.points, 0);
        // The ineligible user's volume still counts towards the total
        assert_eq!(report.unallocated, 500);
    }

    #[tokio::test]
    async fn test_global_eligibility_counts_other_campaigns() {
        let (store, service) = fixture(100).await;
        store.insert_campaign(campaign(5, false)).await;
        store
            .insert_task(task(TaskId(50), 5, tradingace_types::TaskType::Onboarding, 0))
            .await;
        store
            .insert_user_task(record(1, 1, TaskId(50), dec!(2000), true, 100))
            .await;
        store
            .insert_user_task(record(2, 1, SHARE_POOL, dec!(10), false, 0))
            .await;

        service.distribute_share_pool(SHARE_POOL).await.unwrap();
        assert_eq!(share_record(&store, 1).await.points, 100);
    }

    #[tokio::test]
    async fn test_campaign_scoped_eligibility_ignores_other_campaigns() {
        let (store, _) = fixture(100).await;
        let service = service_for(
            &store,
            RewardRules {
                eligibility: EligibilityScope::CampaignOnboarding,
                ..Default::default()
            },
        );
        store.insert_campaign(campaign(5, false)).await;
        store
            .insert_task(task(TaskId(50), 5, tradingace_types::TaskType::Onboarding, 0))
            .await;
        store
            .insert_user_task(record(1, 1, TaskId(50), dec!(2000), true, 100))
            .await;
        store
            .insert_user_task(record(2, 1, SHARE_POOL, dec!(10), false, 0))
            .await;
        seed(&store, 2, dec!(10)).await;

        let report = service.distribute_share_pool(SHARE_POOL).await.unwrap();
        assert_eq!(report.ineligible, vec![user(1)]);
        assert_eq!(share_record(&store, 2).await.points, 50);
    }

    #[tokio::test]
    async fn test_zero_volume_performs_no_writes() {
        let (store, service) = fixture(1000).await;
        store
            .insert_user_task(record(1, 1, SHARE_POOL, Decimal::ZERO, false, 0))
            .await;
        let before = store.all_user_tasks().await;

        let report = service.distribute_share_pool(SHARE_POOL).await.unwrap();

        assert_eq!(report.records_updated, 0);
        assert!(report.awards.is_empty());
        assert_eq!(store.all_user_tasks().await, before);
    }

    #[tokio::test]
    async fn test_rerun_without_new_volume_is_noop() {
        let (store, service) = fixture(10).await;
        seed(&store, 1, dec!(1)).await;
        seed(&store, 2, dec!(2)).await;

        let first = service.distribute_share_pool(SHARE_POOL).await.unwrap();
        let after_first = store.all_user_tasks().await;

        let second = service.distribute_share_pool(SHARE_POOL).await.unwrap();
        assert_eq!(first.records_updated, 2);
        assert_eq!(second.records_updated, 0);
        assert_eq!(second.awards, first.awards);
        assert_eq!(store.all_user_tasks().await, after_first);
    }

    #[tokio::test]
    async fn test_partial_failure_converges_on_rerun() {
        let (clean_store, clean) = fixture(1000).await;
        let (store, service) = fixture(1000).await;
        for s in [&clean_store, &store] {
            seed(s, 1, dec!(100)).await;
            seed(s, 2, dec!(300)).await;
            seed(s, 3, dec!(600)).await;
        }
        clean.distribute_share_pool(SHARE_POOL).await.unwrap();

        store.fail_awards_for(&user(2));
        let err = service.distribute_share_pool(SHARE_POOL).await.unwrap_err();
        assert!(matches!(err, CampaignError::Storage(_)));
        // Awards before the failure stay applied
        assert_eq!(share_record(&store, 1).await.points, 100);
        assert_eq!(share_record(&store, 3).await.status, TaskStatus::InProgress);

        store.clear_failures();
        let report = service.distribute_share_pool(SHARE_POOL).await.unwrap();
        assert_eq!(report.records_updated, 2);

        for n in 1..=3 {
            let (a, b) = (share_record(&store, n).await, share_record(&clean_store, n).await);
            assert_eq!((a.status, a.points), (b.status, b.points));
        }
    }

    #[tokio::test]
    async fn test_unknown_task_is_not_found() {
        let (_, service) = fixture(1000).await;
        let err = service.distribute_share_pool(TaskId(404)).await.unwrap_err();
        assert!(matches!(err, CampaignError::TaskNotFound(TaskId(404))));
    }

    #[tokio::test]
    async fn test_onboarding_task_is_rejected() {
        let (_, service) = fixture(1000).await;
        let err = service.distribute_share_pool(ONBOARDING).await.unwrap_err();
        assert!(matches!(err, CampaignError::WrongTaskType { .. }));
    }

    #[tokio::test]
    async fn test_end_to_end_from_trade_events() {
        let store = Arc::new(crate::InMemoryStore::new());
        store.insert_campaign(campaign(1, true)).await;
        store
            .insert_task(task(ONBOARDING, 1, tradingace_types::TaskType::Onboarding, 0))
            .await;
        store
            .insert_task(task(SHARE_POOL, 1, tradingace_types::TaskType::SharePool, 1000))
            .await;
        let service = service_for(&store, RewardRules::default());

        service.on_trade_event(&swap(1, 1500)).await.unwrap();
        service.on_trade_event(&swap(2, 500)).await.unwrap();

        let report = service.distribute_share_pool(SHARE_POOL).await.unwrap();
        // user 2 never reached the onboarding threshold
        assert_eq!(report.ineligible, vec![user(2)]);
        assert_eq!(share_record(&store, 1).await.points, 750);
    }
}
