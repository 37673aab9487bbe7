//! Shared fixtures for engine tests

use std::sync::Arc;

use alloy_primitives::{Address, B256, U256};
use chrono::{Duration, Utc};
use rust_decimal::Decimal;

use tradingace_types::{
    Campaign, CampaignId, CampaignStatus, RewardRules, SwapEvent, Task, TaskId, TaskStatus,
    TaskType, UserAddress, UserTask, UserTaskId,
};

use crate::{CampaignService, InMemoryStore};

pub const ONBOARDING: TaskId = TaskId(1);
pub const SHARE_POOL: TaskId = TaskId(2);

pub fn address(n: u8) -> Address {
    let mut bytes = [0u8; 20];
    bytes[19] = n;
    Address::from(bytes)
}

pub fn user(n: u8) -> UserAddress {
    UserAddress::from(address(n))
}

/// A swap of `usdc` whole units on the token1 "in" leg
pub fn swap(n: u8, usdc: u64) -> SwapEvent {
    SwapEvent {
        sender: address(n),
        amount0_in: U256::ZERO,
        amount1_in: U256::from(usdc) * U256::from(1_000_000u64),
        amount0_out: U256::from(1u64),
        amount1_out: U256::ZERO,
        block_number: 1,
        tx_hash: B256::ZERO,
    }
}

pub fn task(id: TaskId, campaign: i64, task_type: TaskType, points_pool: i64) -> Task {
    let now = Utc::now();
    Task {
        id,
        campaign_id: CampaignId(campaign),
        task_type,
        start_time: now - Duration::days(7),
        end_time: now + Duration::days(7),
        pool_address: "0xb4e16d0168e52d35cacd2c6185b44281ec28c9dc".to_string(),
        points_pool,
    }
}

pub fn campaign(id: i64, active: bool) -> Campaign {
    let now = Utc::now();
    let (start, end) = if active {
        (now - Duration::days(7), now + Duration::days(7))
    } else {
        (now - Duration::days(60), now - Duration::days(30))
    };
    Campaign {
        id: CampaignId(id),
        start_time: start,
        end_time: end,
        status: if active {
            CampaignStatus::Active
        } else {
            CampaignStatus::Ended
        },
    }
}

/// A completed or in-progress record seeded outside the merge path
pub fn record(id: i64, n: u8, task_id: TaskId, amount: Decimal, completed: bool, points: i64) -> UserTask {
    UserTask {
        id: UserTaskId(id),
        user_id: user(n),
        task_id,
        status: if completed {
            TaskStatus::Completed
        } else {
            TaskStatus::InProgress
        },
        amount,
        points,
        updated_at: Utc::now(),
    }
}

/// Store with active campaign 1 owning an onboarding task and a share-pool
/// task with the given pool
pub async fn fixture(points_pool: i64) -> (Arc<InMemoryStore>, CampaignService) {
    let store = Arc::new(InMemoryStore::new());
    store.insert_campaign(campaign(1, true)).await;
    store.insert_task(task(ONBOARDING, 1, TaskType::Onboarding, 0)).await;
    store
        .insert_task(task(SHARE_POOL, 1, TaskType::SharePool, points_pool))
        .await;
    let service = service_for(&store, RewardRules::default());
    (store, service)
}

pub fn service_for(store: &Arc<InMemoryStore>, rules: RewardRules) -> CampaignService {
    CampaignService::new(store.clone(), store.clone(), store.clone(), rules)
}
