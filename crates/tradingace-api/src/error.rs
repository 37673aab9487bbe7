//! API error handling
//!
//! Engine errors are mapped by kind onto HTTP status codes. Every error body
//! has the same `{ "code", "msg" }` shape.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

use tradingace_types::{CampaignError, ErrorKind};

/// API result type
pub type ApiResult<T> = Result<T, ApiError>;

/// API error with stable numeric codes
#[derive(Debug, Error)]
pub enum ApiError {
    // =========================================================================
    // Request Errors (-1100 to -1199)
    // =========================================================================
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    // =========================================================================
    // Campaign Errors (-2000 to -2099)
    // =========================================================================
    #[error("No active campaign")]
    NoActiveCampaign,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    // =========================================================================
    // Internal Errors (-5000 to -5099)
    // =========================================================================
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl ApiError {
    pub fn error_code(&self) -> i32 {
        match self {
            Self::BadRequest(_) => -1100,
            Self::InvalidAddress(_) => -1102,
            Self::NoActiveCampaign => -2001,
            Self::NotFound(_) => -2002,
            Self::Conflict(_) => -2010,
            Self::Internal(_) => -5000,
            Self::ServiceUnavailable(_) => -5001,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::InvalidAddress(_) => StatusCode::BAD_REQUEST,
            Self::NoActiveCampaign | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

/// Error response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: i32,
    pub msg: String,
}

impl From<&ApiError> for ErrorResponse {
    fn from(err: &ApiError) -> Self {
        Self {
            code: err.error_code(),
            msg: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(ErrorResponse::from(&self))).into_response()
    }
}

impl From<CampaignError> for ApiError {
    fn from(err: CampaignError) -> Self {
        match err {
            CampaignError::NoActiveCampaign => Self::NoActiveCampaign,
            CampaignError::InvalidAddress(detail) => Self::InvalidAddress(detail),
            CampaignError::FeedClosed => Self::ServiceUnavailable("trade feed closed".to_string()),
            other => match other.kind() {
                ErrorKind::NotFound => Self::NotFound(other.to_string()),
                ErrorKind::InvalidInput => Self::BadRequest(other.to_string()),
                ErrorKind::InvalidState => Self::Conflict(other.to_string()),
                ErrorKind::Storage => {
                    // Details stay in the logs
                    error!(error = %other, "Storage failure while serving request");
                    Self::Internal("storage unavailable".to_string())
                }
            },
        }
    }
}
