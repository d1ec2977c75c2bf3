//! Error types for SnapVault

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a device could not be acquired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceAccessKind {
    /// The user or platform refused camera/microphone access
    PermissionDenied,
    /// No matching input device exists
    NotFound,
    /// A device exists but cannot satisfy the requested constraints
    ConstraintsUnsatisfiable,
    /// Anything else reported by the platform
    Other,
}

impl std::fmt::Display for DeviceAccessKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DeviceAccessKind::PermissionDenied => "permission denied",
            DeviceAccessKind::NotFound => "device not found",
            DeviceAccessKind::ConstraintsUnsatisfiable => "constraints unsatisfiable",
            DeviceAccessKind::Other => "device error",
        };
        f.write_str(name)
    }
}

/// Main error type for SnapVault operations
#[derive(Error, Debug, Clone)]
pub enum SnapVaultError {
    /// Camera or microphone could not be acquired
    #[error("Device access failed ({kind}): {reason}")]
    DeviceAccess {
        /// Failure classification
        kind: DeviceAccessKind,
        /// Platform supplied reason
        reason: String,
    },

    /// Capture or recording codec failure
    #[error("Encoding failed: {codec} - {reason}")]
    Encoding {
        /// Codec or container name
        codec: String,
        /// Failure reason
        reason: String,
    },

    /// Upload transport or service failure
    #[error("Upload failed: {reason}")]
    Upload {
        /// Failure reason
        reason: String,
    },

    /// Invalid configuration value
    #[error("Invalid configuration: {message}")]
    Configuration {
        /// Error message
        message: String,
    },

    /// Initialization error
    #[error("Initialization failed: {reason}")]
    Initialization {
        /// Reason for initialization failure
        reason: String,
    },
}

/// Result type alias for SnapVault operations
pub type SnapVaultResult<T> = Result<T, SnapVaultError>;

impl SnapVaultError {
    /// Check if the user can recover by repeating the action
    pub fn is_recoverable(&self) -> bool {
        match self {
            SnapVaultError::DeviceAccess { .. } => true,
            SnapVaultError::Encoding { .. } => true,
            SnapVaultError::Upload { .. } => true,
            SnapVaultError::Configuration { .. } => false,
            SnapVaultError::Initialization { .. } => false,
        }
    }

    /// Get error category
    pub fn category(&self) -> ErrorCategory {
        match self {
            SnapVaultError::DeviceAccess { .. } => ErrorCategory::Device,
            SnapVaultError::Encoding { .. } => ErrorCategory::Codec,
            SnapVaultError::Upload { .. } => ErrorCategory::Network,
            SnapVaultError::Configuration { .. } => ErrorCategory::Configuration,
            SnapVaultError::Initialization { .. } => ErrorCategory::System,
        }
    }

    /// Message suitable for showing in the capture status line
    pub fn user_message(&self) -> String {
        match self {
            SnapVaultError::DeviceAccess { kind, .. } => match kind {
                DeviceAccessKind::PermissionDenied => {
                    "Unable to access camera. Please ensure camera permissions are granted."
                        .to_string()
                }
                DeviceAccessKind::NotFound => {
                    "No camera was found. Connect a camera and try again.".to_string()
                }
                DeviceAccessKind::ConstraintsUnsatisfiable => {
                    "The camera does not support the requested settings.".to_string()
                }
                DeviceAccessKind::Other => {
                    "Unable to access camera. Please try again.".to_string()
                }
            },
            SnapVaultError::Encoding { .. } => "Capture failed. Please try again.".to_string(),
            SnapVaultError::Upload { .. } => "Upload failed. Please try again.".to_string(),
            other => other.to_string(),
        }
    }
}

/// Error categories for classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Camera and microphone errors
    Device,
    /// Encoder and recorder errors
    Codec,
    /// Upload and API errors
    Network,
    /// Configuration errors
    Configuration,
    /// Everything else
    System,
}
