//! Campaign repository

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::{DbCampaign, DbResult};

pub struct CampaignRepo {
    pool: PgPool,
}

impl CampaignRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Campaign whose window contains `now`; the latest start wins on overlap
    pub async fn find_active(&self, now: DateTime<Utc>) -> DbResult<Option<DbCampaign>> {
        let campaign = sqlx::query_as::<_, DbCampaign>(
            r#"
            SELECT id, start_time, end_time, status
            FROM campaigns
            WHERE start_time <= $1 AND end_time > $1
            ORDER BY start_time DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;
        Ok(campaign)
    }
}
