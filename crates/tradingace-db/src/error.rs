//! Database error types

use thiserror::Error;

use tradingace_types::CampaignError;

/// Database operation errors
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Query error: {0}")]
    Query(#[from] sqlx::Error),

    /// A stored row could not be mapped to a domain value
    #[error("Decode error: {0}")]
    Decode(String),

    /// A write would push an amount past the `user_tasks_amount` bound
    #[error("Amount out of range: {0}")]
    AmountOutOfRange(String),
}

/// Constraint bounding `user_tasks.amount`
pub(crate) const AMOUNT_CONSTRAINT: &str = "user_tasks_amount";

impl DbError {
    /// Classify a query error, singling out amount range violations
    pub(crate) fn from_write(err: sqlx::Error, context: impl FnOnce() -> String) -> Self {
        let violates_amount = err
            .as_database_error()
            .and_then(|db| db.constraint())
            .is_some_and(|name| name == AMOUNT_CONSTRAINT);
        if violates_amount {
            DbError::AmountOutOfRange(context())
        } else {
            DbError::Query(err)
        }
    }
}

/// Result type for database operations
pub type DbResult<T> = Result<T, DbError>;

impl From<DbError> for CampaignError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::AmountOutOfRange(detail) => CampaignError::AmountOutOfRange(detail),
            other => CampaignError::Storage(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_errors_surface_as_retryable_storage() {
        let err: CampaignError = DbError::Query(sqlx::Error::PoolTimedOut).into();
        assert!(matches!(err, CampaignError::Storage(_)));
        assert!(err.is_retryable());

        let err: CampaignError = DbError::Decode("bad status".into()).into();
        assert!(err.to_string().contains("bad status"));
    }

    #[test]
    fn test_amount_bound_is_not_retryable() {
        let err: CampaignError = DbError::AmountOutOfRange("0xaa on task 2".into()).into();
        assert!(matches!(err, CampaignError::AmountOutOfRange(_)));
        assert!(!err.is_retryable());

        let err = DbError::from_write(sqlx::Error::RowNotFound, || "unused".to_string());
        assert!(matches!(err, DbError::Query(_)));
    }
}
