//! User task repository
//!
//! The merge rule runs inside PostgreSQL so concurrent writers to the same
//! `(user_id, task_id)` row serialize on the row lock taken by the upsert.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use tradingace_types::{TaskStatus, UserTaskMerge};

use crate::{DbError, DbResult, DbUserPoints, DbUserTask, DbUserVolume};

/// Insert a fresh record or merge into the existing one.
///
/// Amount always accumulates. A completed row keeps status and points;
/// otherwise the optional threshold ($7) is checked against the new
/// cumulative amount and, when reached, completes the row with $8 points.
const MERGE_SQL: &str = r#"
    INSERT INTO user_tasks (user_id, task_id, status, amount, points, updated_at)
    VALUES ($1, $2, $3, $4, $5, $6)
    ON CONFLICT (user_id, task_id) DO UPDATE
    SET amount = user_tasks.amount + EXCLUDED.amount,
        status = CASE
            WHEN user_tasks.status = 'completed' THEN user_tasks.status
            WHEN $7::NUMERIC IS NOT NULL
                AND user_tasks.amount + EXCLUDED.amount >= $7::NUMERIC THEN 'completed'
            ELSE user_tasks.status
        END,
        points = CASE
            WHEN user_tasks.status = 'completed' THEN user_tasks.points
            WHEN $7::NUMERIC IS NOT NULL
                AND user_tasks.amount + EXCLUDED.amount >= $7::NUMERIC THEN $8::BIGINT
            ELSE user_tasks.points
        END,
        updated_at = EXCLUDED.updated_at
    RETURNING id, user_id, task_id, status, amount, points, updated_at
"#;

pub struct UserTaskRepo {
    pool: PgPool,
}

impl UserTaskRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply every merge in one transaction
    pub async fn merge_all(&self, merges: &[UserTaskMerge]) -> DbResult<Vec<DbUserTask>> {
        let mut tx = self.pool.begin().await?;
        let mut rows = Vec::with_capacity(merges.len());

        for merge in merges {
            // Values for a first insert: the merge applied to an empty record
            let (status, points) = merge.initial_state();

            let row = sqlx::query_as::<_, DbUserTask>(MERGE_SQL)
                .bind(merge.user_id.as_str())
                .bind(merge.task_id.get())
                .bind(status.as_str())
                .bind(merge.amount)
                .bind(points)
                .bind(merge.updated_at)
                .bind(merge.completion.map(|rule| rule.threshold))
                .bind(merge.completion.map(|rule| rule.points))
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| {
                    DbError::from_write(e, || {
                        format!("cumulative amount of {} on task {}", merge.user_id, merge.task_id)
                    })
                })?;
            rows.push(row);
        }

        tx.commit().await?;
        Ok(rows)
    }

    pub async fn find_by_user(&self, user_id: &str) -> DbResult<Vec<DbUserTask>> {
        let tasks = sqlx::query_as::<_, DbUserTask>(
            r#"
            SELECT id, user_id, task_id, status, amount, points, updated_at
            FROM user_tasks
            WHERE user_id = $1
            ORDER BY task_id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(tasks)
    }

    pub async fn volumes_by_task(&self, task_id: i64) -> DbResult<Vec<DbUserVolume>> {
        let volumes = sqlx::query_as::<_, DbUserVolume>(
            r#"
            SELECT user_id, SUM(amount) AS amount
            FROM user_tasks
            WHERE task_id = $1
            GROUP BY user_id
            ORDER BY user_id
            "#,
        )
        .bind(task_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(volumes)
    }

    /// Whether the user has any completed record, optionally restricted to
    /// the given tasks
    pub async fn has_completed(&self, user_id: &str, task_ids: Option<Vec<i64>>) -> DbResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM user_tasks
                WHERE user_id = $1
                  AND status = $2
                  AND ($3::BIGINT[] IS NULL OR task_id = ANY($3))
            )
            "#,
        )
        .bind(user_id)
        .bind(TaskStatus::Completed.as_str())
        .bind(task_ids)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Overwrite status and points; returns whether a row changed
    pub async fn award(
        &self,
        task_id: i64,
        user_id: &str,
        points: i64,
        at: DateTime<Utc>,
    ) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE user_tasks
            SET points = $1, status = $2, updated_at = $3
            WHERE task_id = $4 AND user_id = $5
              AND (status <> $2 OR points <> $1)
            "#,
        )
        .bind(points)
        .bind(TaskStatus::Completed.as_str())
        .bind(at)
        .bind(task_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Point totals of completed records over the given tasks
    pub async fn points_by_user(&self, task_ids: &[i64]) -> DbResult<Vec<DbUserPoints>> {
        let points = sqlx::query_as::<_, DbUserPoints>(
            r#"
            SELECT user_id,
                   SUM(points)::BIGINT AS total_points,
                   MAX(updated_at) AS last_updated
            FROM user_tasks
            WHERE task_id = ANY($1) AND status = $2
            GROUP BY user_id
            "#,
        )
        .bind(task_ids)
        .bind(TaskStatus::Completed.as_str())
        .fetch_all(&self.pool)
        .await?;
        Ok(points)
    }
}
