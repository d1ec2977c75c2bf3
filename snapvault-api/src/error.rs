//! API error types

use snapvault_core::SnapVaultError;
use thiserror::Error;

/// Errors talking to the media backend
#[derive(Error, Debug)]
pub enum ApiError {
    /// Transport failure
    #[error("HTTP error: {source}")]
    Http {
        /// Underlying client error
        #[from]
        source: reqwest::Error,
    },

    /// Non-success status without a usable body
    #[error("Unexpected status {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, possibly truncated
        body: String,
    },

    /// Body did not match the expected shape
    #[error("Failed to decode response: {reason}")]
    Decode {
        /// Decoder message
        reason: String,
    },

    /// Base URL or path could not be parsed
    #[error("Invalid URL: {reason}")]
    InvalidUrl {
        /// Parser message
        reason: String,
    },
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// Whether retrying the same request might succeed
    pub fn is_recoverable(&self) -> bool {
        match self {
            ApiError::Http { source } => source.is_timeout() || source.is_connect(),
            ApiError::Status { status, .. } => *status >= 500,
            ApiError::Decode { .. } => false,
            ApiError::InvalidUrl { .. } => false,
        }
    }
}

impl From<url::ParseError> for ApiError {
    fn from(error: url::ParseError) -> Self {
        ApiError::InvalidUrl {
            reason: error.to_string(),
        }
    }
}

impl From<ApiError> for SnapVaultError {
    fn from(error: ApiError) -> Self {
        match error {
            ApiError::InvalidUrl { reason } => SnapVaultError::Configuration { message: reason },
            other => SnapVaultError::Upload {
                reason: other.to_string(),
            },
        }
    }
}
