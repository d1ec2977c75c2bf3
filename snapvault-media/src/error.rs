//! Media error types and handling
//!
//! Errors raised by device sources, encoders and recorders. They are
//! converted into [`SnapVaultError`] at the session boundary, where they
//! become status messages.

use snapvault_core::{DeviceAccessKind, SnapVaultError};
use thiserror::Error;

/// Main error type for media operations
#[derive(Error, Debug, Clone)]
pub enum MediaError {
    /// Device acquisition refused or impossible
    #[error("Device access failed ({kind}): {reason}")]
    DeviceAccess {
        /// Failure classification
        kind: DeviceAccessKind,
        /// Platform supplied reason
        reason: String,
    },

    /// The encoder does not accept the requested MIME type
    #[error("Unsupported codec: {mime_type}")]
    UnsupportedCodec {
        /// Requested MIME type
        mime_type: String,
    },

    /// Encoding operation failed
    #[error("Encoding failed: {codec} - {reason}")]
    EncodingFailed {
        /// Codec name
        codec: String,
        /// Failure reason
        reason: String,
    },

    /// Invalid frame data error
    #[error("Invalid frame data: expected {expected} bytes, got {actual}")]
    InvalidFrameData {
        /// Expected data size
        expected: usize,
        /// Actual data size
        actual: usize,
    },

    /// The stream has no live video track
    #[error("Capture not active")]
    CaptureNotActive,

    /// Invalid state for operation
    #[error("Invalid state: {message}")]
    InvalidState {
        /// State error message
        message: String,
    },
}

/// Result type alias for media operations
pub type MediaResult<T> = Result<T, MediaError>;

impl MediaError {
    /// Check if error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            MediaError::DeviceAccess { .. } => true,
            MediaError::UnsupportedCodec { .. } => true,
            MediaError::EncodingFailed { .. } => true,
            MediaError::CaptureNotActive => true,
            MediaError::InvalidFrameData { .. } => false,
            MediaError::InvalidState { .. } => false,
        }
    }

    /// Get error category
    pub fn category(&self) -> ErrorCategory {
        match self {
            MediaError::DeviceAccess { .. } => ErrorCategory::Device,
            MediaError::UnsupportedCodec { .. } => ErrorCategory::Codec,
            MediaError::EncodingFailed { .. } => ErrorCategory::Codec,
            MediaError::InvalidFrameData { .. } => ErrorCategory::Data,
            MediaError::CaptureNotActive => ErrorCategory::State,
            MediaError::InvalidState { .. } => ErrorCategory::State,
        }
    }
}

/// Error categories for classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Device and hardware errors
    Device,
    /// Codec-related errors
    Codec,
    /// Data validation errors
    Data,
    /// State management errors
    State,
}

impl From<MediaError> for SnapVaultError {
    fn from(error: MediaError) -> Self {
        match error {
            MediaError::DeviceAccess { kind, reason } => SnapVaultError::DeviceAccess { kind, reason },
            MediaError::UnsupportedCodec { mime_type } => SnapVaultError::Encoding {
                codec: mime_type,
                reason: "codec not supported".to_string(),
            },
            MediaError::EncodingFailed { codec, reason } => {
                SnapVaultError::Encoding { codec, reason }
            }
            other => SnapVaultError::Encoding {
                codec: "capture".to_string(),
                reason: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        let codec = MediaError::UnsupportedCodec {
            mime_type: "video/webm;codecs=vp9".to_string(),
        };
        assert_eq!(codec.category(), ErrorCategory::Codec);
        assert!(codec.is_recoverable());

        let data = MediaError::InvalidFrameData {
            expected: 1024,
            actual: 512,
        };
        assert_eq!(data.category(), ErrorCategory::Data);
        assert_eq!(
            data.to_string(),
            "Invalid frame data: expected 1024 bytes, got 512"
        );
    }

    #[test]
    fn test_into_session_error() {
        let error: SnapVaultError = MediaError::DeviceAccess {
            kind: DeviceAccessKind::NotFound,
            reason: "no camera".to_string(),
        }
        .into();
        assert_eq!(
            error.user_message(),
            "No camera was found. Connect a camera and try again."
        );
    }
}
