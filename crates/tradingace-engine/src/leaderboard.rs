//! Leaderboard aggregation
//!
//! Computed on demand from completed records of the active campaign's tasks.
//! Nothing is cached or persisted.

use tracing::debug;

use tradingace_types::{CampaignError, CampaignResult, TaskId, UserPoints, UserRanking};

use crate::service::CampaignService;

/// Order point totals and assign dense ranks.
///
/// Higher totals rank first. Equal totals share a rank and the next distinct
/// total takes the following rank, with no gaps. Within a tie, rows are
/// ordered by earliest `last_updated`, then by address. `last_updated` is
/// the latest activity on the counted records, not the completion time.
pub fn dense_rank(mut points: Vec<UserPoints>) -> Vec<UserRanking> {
    points.sort_by(|a, b| {
        b.total_points
            .cmp(&a.total_points)
            .then_with(|| a.last_updated.cmp(&b.last_updated))
            .then_with(|| a.user_id.cmp(&b.user_id))
    });

    let mut rank = 0u32;
    let mut previous: Option<i64> = None;

    points
        .into_iter()
        .map(|row| {
            if previous != Some(row.total_points) {
                rank += 1;
                previous = Some(row.total_points);
            }
            UserRanking {
                user_id: row.user_id,
                total_points: row.total_points,
                rank,
                updated_at: row.last_updated,
            }
        })
        .collect()
}

impl CampaignService {
    /// Rank every user with completed records in the active campaign.
    ///
    /// Fails with `NoActiveCampaign` when nothing is active; an active
    /// campaign without tasks yields an empty leaderboard.
    pub async fn get_leaderboard(&self) -> CampaignResult<Vec<UserRanking>> {
        let campaign = self
            .resolve_active_campaign()
            .await?
            .ok_or(CampaignError::NoActiveCampaign)?;

        let task_ids: Vec<TaskId> = self
            .tasks
            .get_tasks_by_campaign(campaign.id)
            .await?
            .into_iter()
            .map(|t| t.id)
            .collect();

        if task_ids.is_empty() {
            return Ok(Vec::new());
        }

        let points = self.user_tasks.get_user_points(&task_ids).await?;
        let ranking = dense_rank(points);

        debug!(campaign_id = %campaign.id, rows = ranking.len(), "Computed leaderboard");
        Ok(ranking)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;
    use chrono::{Duration, Utc};
    use rust_decimal_macros::dec;
    use std::sync::Arc;
    use tradingace_types::RewardRules;

    fn points(n: u8, total: i64, minutes_ago: i64) -> UserPoints {
        UserPoints {
            user_id: user(n),
            total_points: total,
            last_updated: Utc::now() - Duration::minutes(minutes_ago),
        }
    }

    #[test]
    fn test_ties_share_rank_without_gaps() {
        let ranked = dense_rank(vec![
            points(1, 100, 0),
            points(2, 300, 0),
            points(3, 100, 0),
            points(4, 50, 0),
        ]);

        let ranks: Vec<(i64, u32)> = ranked.iter().map(|r| (r.total_points, r.rank)).collect();
        assert_eq!(ranks, vec![(300, 1), (100, 2), (100, 2), (50, 3)]);
    }

    #[test]
    fn test_tie_order_is_earliest_first() {
        let ranked = dense_rank(vec![points(3, 10, 1), points(1, 10, 1), points(2, 10, 5)]);
        assert_eq!(ranked[0].user_id, user(2));
        assert!(ranked.iter().all(|r| r.rank == 1));
    }

    #[test]
    fn test_tie_broken_by_address() {
        let at = Utc::now();
        let row = |n| UserPoints {
            user_id: user(n),
            total_points: 5,
            last_updated: at,
        };
        let ranked = dense_rank(vec![row(9), row(4)]);
        assert_eq!(ranked[0].user_id, user(4));
        assert_eq!(ranked[1].user_id, user(9));
    }

    #[test]
    fn test_empty_input() {
        assert!(dense_rank(Vec::new()).is_empty());
    }

    #[tokio::test]
    async fn test_sums_completed_records_of_active_campaign() {
        let (store, service) = fixture(1000).await;
        store
            .insert_user_task(record(1, 1, ONBOARDING, dec!(2000), true, 100))
            .await;
        store
            .insert_user_task(record(2, 1, SHARE_POOL, dec!(2000), true, 400))
            .await;
        store
            .insert_user_task(record(3, 2, ONBOARDING, dec!(1500), true, 100))
            .await;
        // in-progress records never count
        store
            .insert_user_task(record(4, 2, SHARE_POOL, dec!(1500), false, 0))
            .await;
        store
            .insert_user_task(record(5, 3, ONBOARDING, dec!(10), false, 0))
            .await;

        let board = service.get_leaderboard().await.unwrap();

        assert_eq!(board.len(), 2);
        assert_eq!((board[0].user_id.clone(), board[0].total_points, board[0].rank), (user(1), 500, 1));
        assert_eq!((board[1].user_id.clone(), board[1].total_points, board[1].rank), (user(2), 100, 2));
    }

    #[tokio::test]
    async fn test_other_campaigns_are_excluded() {
        let (store, service) = fixture(1000).await;
        store.insert_campaign(campaign(7, false)).await;
        store
            .insert_task(task(TaskId(70), 7, tradingace_types::TaskType::Onboarding, 0))
            .await;
        store
            .insert_user_task(record(1, 5, TaskId(70), dec!(5000), true, 100))
            .await;

        assert!(service.get_leaderboard().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_no_active_campaign_is_an_error() {
        let store = Arc::new(crate::InMemoryStore::new());
        store.insert_campaign(campaign(1, false)).await;
        let service = service_for(&store, RewardRules::default());

        let err = service.get_leaderboard().await.unwrap_err();
        assert!(matches!(err, CampaignError::NoActiveCampaign));
    }

    #[tokio::test]
    async fn test_campaign_without_tasks_is_empty() {
        let store = Arc::new(crate::InMemoryStore::new());
        store.insert_campaign(campaign(1, true)).await;
        let service = service_for(&store, RewardRules::default());

        assert!(service.get_leaderboard().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_leaderboard_after_distribution() {
        let (store, service) = fixture(1000).await;
        service.on_trade_event(&swap(1, 3000)).await.unwrap();
        service.on_trade_event(&swap(2, 1000)).await.unwrap();
        service.distribute_share_pool(SHARE_POOL).await.unwrap();

        let board = service.get_leaderboard().await.unwrap();
        assert_eq!(board[0].user_id, user(1));
        assert_eq!(board[0].total_points, 850);
        assert_eq!(board[1].total_points, 350);
        assert_eq!(store.all_user_tasks().await.len(), 4);
    }

    #[tokio::test]
    async fn test_trading_after_completion_moves_user_behind_in_tie() {
        let (_, service) = fixture(1000).await;
        service.on_trade_event(&swap(1, 1000)).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        service.on_trade_event(&swap(2, 1000)).await.unwrap();

        let board = service.get_leaderboard().await.unwrap();
        assert_eq!(board[0].user_id, user(1));

        // Merges into the frozen record still refresh its timestamp
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        service.on_trade_event(&swap(1, 10)).await.unwrap();

        let board = service.get_leaderboard().await.unwrap();
        assert_eq!(board[0].user_id, user(2));
        assert_eq!(board[1].user_id, user(1));
        assert_eq!((board[0].rank, board[1].rank), (1, 1));
        assert_eq!(board[1].total_points, 100);
    }
}
