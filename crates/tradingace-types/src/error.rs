//! Error types for TradingAce
//!
//! Every failure carries a structured kind so transport adapters can map it
//! deterministically. Messages are for humans only.

use thiserror::Error;

use crate::identity::TaskId;

/// Result type for campaign operations
pub type CampaignResult<T> = Result<T, CampaignError>;

/// Coarse classification of a [`CampaignError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A referenced entity does not exist
    NotFound,
    /// The caller supplied malformed input
    InvalidInput,
    /// The operation does not apply to the entity in its current state
    InvalidState,
    /// A persistence call failed
    Storage,
}

/// Campaign engine errors
#[derive(Debug, Clone, Error)]
pub enum CampaignError {
    // ========================================================================
    // Not Found
    // ========================================================================

    /// No campaign is active at the evaluation time
    #[error("No active campaign")]
    NoActiveCampaign,

    /// Task id is unknown
    #[error("Task {0} not found")]
    TaskNotFound(TaskId),

    // ========================================================================
    // Invalid Input
    // ========================================================================

    /// Address could not be parsed
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Raw event could not be decoded
    #[error("Invalid swap event: {0}")]
    InvalidEvent(String),

    /// A trade leg does not fit the decimal amount type
    #[error("Trade amount out of range: {0}")]
    AmountOutOfRange(String),

    // ========================================================================
    // Invalid State
    // ========================================================================

    /// Task has the wrong type for the requested operation
    #[error("Task {task_id} is a {actual} task, expected {expected}")]
    WrongTaskType {
        task_id: TaskId,
        expected: String,
        actual: String,
    },

    /// The trade feed is shut down and accepts no more events
    #[error("Trade feed closed")]
    FeedClosed,

    // ========================================================================
    // Storage
    // ========================================================================

    /// Propagated persistence failure
    #[error("Storage error: {0}")]
    Storage(String),
}

impl CampaignError {
    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoActiveCampaign | Self::TaskNotFound(_) => ErrorKind::NotFound,
            Self::InvalidAddress(_) | Self::InvalidEvent(_) | Self::AmountOutOfRange(_) => {
                ErrorKind::InvalidInput
            }
            Self::WrongTaskType { .. } | Self::FeedClosed => ErrorKind::InvalidState,
            Self::Storage(_) => ErrorKind::Storage,
        }
    }

    /// Check if this error is a not-found condition
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// Whether retrying the same call may succeed
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Storage
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(CampaignError::NoActiveCampaign.kind(), ErrorKind::NotFound);
        assert_eq!(CampaignError::TaskNotFound(TaskId(1)).kind(), ErrorKind::NotFound);
        assert_eq!(
            CampaignError::InvalidAddress("x".into()).kind(),
            ErrorKind::InvalidInput
        );
        assert_eq!(CampaignError::Storage("down".into()).kind(), ErrorKind::Storage);
    }

    #[test]
    fn test_only_storage_errors_are_retryable() {
        assert!(CampaignError::Storage("timeout".into()).is_retryable());
        assert!(!CampaignError::NoActiveCampaign.is_retryable());
        assert!(!CampaignError::InvalidEvent("short".into()).is_retryable());
    }

    #[test]
    fn test_error_display() {
        let err = CampaignError::WrongTaskType {
            task_id: TaskId(3),
            expected: "share_pool".into(),
            actual: "onboarding".into(),
        };
        assert_eq!(err.to_string(), "Task 3 is a onboarding task, expected share_pool");
    }
}
