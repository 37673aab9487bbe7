//! Task repository

use sqlx::PgPool;

use crate::{DbResult, DbTask};

const TASK_COLUMNS: &str =
    "id, campaign_id, type, start_time, end_time, pool_address, points_pool";

pub struct TaskRepo {
    pool: PgPool,
}

impl TaskRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_campaign(&self, campaign_id: i64) -> DbResult<Vec<DbTask>> {
        let tasks = sqlx::query_as::<_, DbTask>(&format!(
            "SELECT {} FROM tasks WHERE campaign_id = $1 ORDER BY id",
            TASK_COLUMNS
        ))
        .bind(campaign_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(tasks)
    }

    pub async fn find_by_id(&self, id: i64) -> DbResult<Option<DbTask>> {
        let task = sqlx::query_as::<_, DbTask>(&format!(
            "SELECT {} FROM tasks WHERE id = $1",
            TASK_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(task)
    }
}
