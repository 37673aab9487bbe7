//! Database models - mapped from PostgreSQL tables

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use tradingace_types::{
    Campaign, CampaignId, CampaignStatus, Task, TaskId, TaskStatus, TaskType, UserAddress,
    UserPoints, UserTask, UserTaskId, UserVolume,
};

use crate::error::DbError;

// ============================================================================
// Campaign Models
// ============================================================================

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DbCampaign {
    pub id: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: String,
}

impl TryFrom<DbCampaign> for Campaign {
    type Error = DbError;

    fn try_from(row: DbCampaign) -> Result<Self, Self::Error> {
        Ok(Campaign {
            id: CampaignId(row.id),
            start_time: row.start_time,
            end_time: row.end_time,
            status: row.status.parse::<CampaignStatus>().map_err(DbError::Decode)?,
        })
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DbTask {
    pub id: i64,
    pub campaign_id: i64,
    #[sqlx(rename = "type")]
    pub task_type: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub pool_address: String,
    pub points_pool: i64,
}

impl TryFrom<DbTask> for Task {
    type Error = DbError;

    fn try_from(row: DbTask) -> Result<Self, Self::Error> {
        Ok(Task {
            id: TaskId(row.id),
            campaign_id: CampaignId(row.campaign_id),
            task_type: row.task_type.parse::<TaskType>().map_err(DbError::Decode)?,
            start_time: row.start_time,
            end_time: row.end_time,
            pool_address: row.pool_address,
            points_pool: row.points_pool,
        })
    }
}

// ============================================================================
// User Task Models
// ============================================================================

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DbUserTask {
    pub id: i64,
    pub user_id: String,
    pub task_id: i64,
    pub status: String,
    pub amount: Decimal,
    pub points: i64,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<DbUserTask> for UserTask {
    type Error = DbError;

    fn try_from(row: DbUserTask) -> Result<Self, Self::Error> {
        Ok(UserTask {
            id: UserTaskId(row.id),
            user_id: UserAddress::from_normalized(row.user_id),
            task_id: TaskId(row.task_id),
            status: row.status.parse::<TaskStatus>().map_err(DbError::Decode)?,
            amount: row.amount,
            points: row.points,
            updated_at: row.updated_at,
        })
    }
}

/// `SUM(amount)` grouped by user
#[derive(Debug, Clone, FromRow)]
pub struct DbUserVolume {
    pub user_id: String,
    pub amount: Decimal,
}

impl From<DbUserVolume> for UserVolume {
    fn from(row: DbUserVolume) -> Self {
        UserVolume {
            user_id: UserAddress::from_normalized(row.user_id),
            amount: row.amount,
        }
    }
}

/// `SUM(points)` of completed records grouped by user
#[derive(Debug, Clone, FromRow)]
pub struct DbUserPoints {
    pub user_id: String,
    pub total_points: i64,
    pub last_updated: DateTime<Utc>,
}

impl From<DbUserPoints> for UserPoints {
    fn from(row: DbUserPoints) -> Self {
        UserPoints {
            user_id: UserAddress::from_normalized(row.user_id),
            total_points: row.total_points,
            last_updated: row.last_updated,
        }
    }
}
