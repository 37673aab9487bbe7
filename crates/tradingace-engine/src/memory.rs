//! In-memory store for tests and local runs

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tokio::sync::RwLock;

use tradingace_types::{
    Campaign, CampaignError, CampaignId, CampaignResult, Task, TaskId, UserAddress, UserPoints,
    UserTask, UserTaskId, UserTaskMerge, UserVolume,
};

use crate::store::{CampaignStore, TaskStore, UserTaskStore};

#[derive(Default)]
struct State {
    campaigns: Vec<Campaign>,
    tasks: BTreeMap<TaskId, Task>,
    user_tasks: BTreeMap<(UserAddress, TaskId), UserTask>,
    next_user_task_id: i64,
}

/// In-memory implementation of every store trait.
///
/// A single lock guards all state, so each call is atomic. Failure hooks let
/// tests simulate storage outages.
pub struct InMemoryStore {
    state: RwLock<State>,
    fail_merges: AtomicBool,
    fail_awards_for: std::sync::Mutex<HashSet<UserAddress>>,
}

impl InMemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State::default()),
            fail_merges: AtomicBool::new(false),
            fail_awards_for: std::sync::Mutex::new(HashSet::new()),
        }
    }

    pub async fn insert_campaign(&self, campaign: Campaign) {
        self.state.write().await.campaigns.push(campaign);
    }

    pub async fn insert_task(&self, task: Task) {
        self.state.write().await.tasks.insert(task.id, task);
    }

    /// Seed a record directly, bypassing the merge rule
    pub async fn insert_user_task(&self, user_task: UserTask) {
        let mut state = self.state.write().await;
        state.next_user_task_id = state.next_user_task_id.max(user_task.id.get());
        state
            .user_tasks
            .insert((user_task.user_id.clone(), user_task.task_id), user_task);
    }

    /// Snapshot of every record, ordered by `(user, task)`
    pub async fn all_user_tasks(&self) -> Vec<UserTask> {
        self.state.read().await.user_tasks.values().cloned().collect()
    }

    /// Make every subsequent merge fail
    pub fn set_fail_merges(&self, fail: bool) {
        self.fail_merges.store(fail, Ordering::SeqCst);
    }

    /// Make awards for `user` fail until cleared
    pub fn fail_awards_for(&self, user: &UserAddress) {
        if let Ok(mut users) = self.fail_awards_for.lock() {
            users.insert(user.clone());
        }
    }

    pub fn clear_failures(&self) {
        self.fail_merges.store(false, Ordering::SeqCst);
        if let Ok(mut users) = self.fail_awards_for.lock() {
            users.clear();
        }
    }

    fn award_should_fail(&self, user: &UserAddress) -> bool {
        self.fail_awards_for
            .lock()
            .map(|users| users.contains(user))
            .unwrap_or(false)
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CampaignStore for InMemoryStore {
    async fn get_active_campaign(&self, now: DateTime<Utc>) -> CampaignResult<Option<Campaign>> {
        let state = self.state.read().await;
        Ok(state
            .campaigns
            .iter()
            .filter(|c| c.is_active_at(now))
            .max_by_key(|c| (c.start_time, c.id))
            .cloned())
    }
}

#[async_trait]
impl TaskStore for InMemoryStore {
    async fn get_tasks_by_campaign(&self, campaign_id: CampaignId) -> CampaignResult<Vec<Task>> {
        let state = self.state.read().await;
        Ok(state
            .tasks
            .values()
            .filter(|t| t.campaign_id == campaign_id)
            .cloned()
            .collect())
    }

    async fn get_task(&self, task_id: TaskId) -> CampaignResult<Option<Task>> {
        Ok(self.state.read().await.tasks.get(&task_id).cloned())
    }
}

#[async_trait]
impl UserTaskStore for InMemoryStore {
    async fn merge_user_tasks(&self, merges: &[UserTaskMerge]) -> CampaignResult<Vec<UserTask>> {
        if self.fail_merges.load(Ordering::SeqCst) {
            return Err(CampaignError::Storage("injected merge failure".to_string()));
        }

        let mut state = self.state.write().await;

        // Stage every record first so a rejected merge leaves nothing applied
        let mut staged: Vec<UserTask> = Vec::with_capacity(merges.len());
        let mut next_id = state.next_user_task_id;
        for merge in merges {
            let key = (merge.user_id.clone(), merge.task_id);
            let pending = staged
                .iter_mut()
                .find(|r| r.user_id == merge.user_id && r.task_id == merge.task_id);
            match pending {
                Some(record) => record.apply_merge(merge)?,
                None => match state.user_tasks.get(&key) {
                    Some(existing) => {
                        let mut record = existing.clone();
                        record.apply_merge(merge)?;
                        staged.push(record);
                    }
                    None => {
                        next_id += 1;
                        staged.push(UserTask::from_merge(UserTaskId(next_id), merge));
                    }
                },
            }
        }

        state.next_user_task_id = next_id;
        for record in &staged {
            state
                .user_tasks
                .insert((record.user_id.clone(), record.task_id), record.clone());
        }

        Ok(staged)
    }

    async fn get_user_tasks(&self, user: &UserAddress) -> CampaignResult<Vec<UserTask>> {
        let state = self.state.read().await;
        Ok(state
            .user_tasks
            .values()
            .filter(|t| &t.user_id == user)
            .cloned()
            .collect())
    }

    async fn get_user_volumes(&self, task_id: TaskId) -> CampaignResult<Vec<UserVolume>> {
        let state = self.state.read().await;
        let mut volumes: BTreeMap<UserAddress, Decimal> = BTreeMap::new();
        for record in state.user_tasks.values().filter(|t| t.task_id == task_id) {
            *volumes.entry(record.user_id.clone()).or_insert(Decimal::ZERO) += record.amount;
        }
        Ok(volumes
            .into_iter()
            .map(|(user_id, amount)| UserVolume { user_id, amount })
            .collect())
    }

    async fn has_completed_task(
        &self,
        user: &UserAddress,
        within: Option<&[TaskId]>,
    ) -> CampaignResult<bool> {
        let state = self.state.read().await;
        Ok(state.user_tasks.values().any(|t| {
            &t.user_id == user
                && t.status.is_completed()
                && within.map_or(true, |ids| ids.contains(&t.task_id))
        }))
    }

    async fn award_points(
        &self,
        task_id: TaskId,
        user: &UserAddress,
        points: i64,
        at: DateTime<Utc>,
    ) -> CampaignResult<bool> {
        if self.award_should_fail(user) {
            return Err(CampaignError::Storage(format!(
                "injected award failure for {}",
                user
            )));
        }

        let mut state = self.state.write().await;
        match state.user_tasks.get_mut(&(user.clone(), task_id)) {
            Some(record) if record.status.is_completed() && record.points == points => Ok(false),
            Some(record) => {
                record.apply_award(points, at);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn get_user_points(&self, task_ids: &[TaskId]) -> CampaignResult<Vec<UserPoints>> {
        let state = self.state.read().await;
        let mut totals: BTreeMap<UserAddress, UserPoints> = BTreeMap::new();

        for record in state
            .user_tasks
            .values()
            .filter(|t| t.status.is_completed() && task_ids.contains(&t.task_id))
        {
            let entry = totals
                .entry(record.user_id.clone())
                .or_insert_with(|| UserPoints {
                    user_id: record.user_id.clone(),
                    total_points: 0,
                    last_updated: record.updated_at,
                });
            entry.total_points += record.points;
            entry.last_updated = entry.last_updated.max(record.updated_at);
        }

        Ok(totals.into_values().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;
    use tradingace_types::{CampaignStatus, CompletionRule, TaskStatus};

    fn user(n: u8) -> UserAddress {
        UserAddress::parse(&format!("0x{:040x}", n)).unwrap()
    }

    fn merge(u: &UserAddress, task: i64, amount: Decimal) -> UserTaskMerge {
        UserTaskMerge {
            user_id: u.clone(),
            task_id: TaskId(task),
            amount,
            completion: Some(CompletionRule {
                threshold: dec!(1000),
                points: 100,
            }),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_merge_creates_then_accumulates() {
        let store = InMemoryStore::new();
        let u = user(1);

        let first = store.merge_user_tasks(&[merge(&u, 1, dec!(600))]).await.unwrap();
        assert_eq!(first[0].status, TaskStatus::InProgress);

        let second = store.merge_user_tasks(&[merge(&u, 1, dec!(500))]).await.unwrap();
        assert_eq!(second[0].id, first[0].id);
        assert_eq!(second[0].amount, dec!(1100));
        assert_eq!(second[0].status, TaskStatus::Completed);
    }

    #[tokio::test]
    async fn test_failed_merge_writes_nothing() {
        let store = InMemoryStore::new();
        store.set_fail_merges(true);
        assert!(store.merge_user_tasks(&[merge(&user(1), 1, dec!(5))]).await.is_err());
        assert!(store.all_user_tasks().await.is_empty());
    }

    #[tokio::test]
    async fn test_overflowing_merge_applies_no_part_of_the_event() {
        let store = InMemoryStore::new();
        let u = user(1);
        let huge = dec!(50000000000000000000000000000);
        store.merge_user_tasks(&[merge(&u, 2, huge)]).await.unwrap();
        let before = store.all_user_tasks().await;

        let err = store
            .merge_user_tasks(&[merge(&u, 1, dec!(5)), merge(&u, 2, huge)])
            .await
            .unwrap_err();

        assert!(matches!(err, CampaignError::AmountOutOfRange(_)));
        assert_eq!(store.all_user_tasks().await, before);
    }

    #[tokio::test]
    async fn test_active_campaign_prefers_latest_start() {
        let store = InMemoryStore::new();
        let now = Utc::now();
        for (id, offset) in [(1, 10), (2, 5)] {
            store
                .insert_campaign(Campaign {
                    id: CampaignId(id),
                    start_time: now - Duration::days(offset),
                    end_time: now + Duration::days(1),
                    status: CampaignStatus::Active,
                })
                .await;
        }
        let active = store.get_active_campaign(now).await.unwrap().unwrap();
        assert_eq!(active.id, CampaignId(2));
        assert!(store
            .get_active_campaign(now + Duration::days(2))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_user_points_only_count_completed() {
        let store = InMemoryStore::new();
        let (a, b) = (user(1), user(2));
        store.merge_user_tasks(&[merge(&a, 1, dec!(1000))]).await.unwrap();
        store.merge_user_tasks(&[merge(&b, 1, dec!(999))]).await.unwrap();

        let points = store.get_user_points(&[TaskId(1)]).await.unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].user_id, a);
        assert_eq!(points[0].total_points, 100);

        assert!(store.get_user_points(&[TaskId(2)]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_award_is_noop_when_unchanged() {
        let store = InMemoryStore::new();
        let u = user(1);
        store.merge_user_tasks(&[merge(&u, 1, dec!(10))]).await.unwrap();

        assert!(store.award_points(TaskId(1), &u, 7, Utc::now()).await.unwrap());
        assert!(!store.award_points(TaskId(1), &u, 7, Utc::now()).await.unwrap());
        assert!(store.award_points(TaskId(1), &u, 8, Utc::now()).await.unwrap());
    }
}
