//! # SnapVault - Camera Capture and Media Gallery
//!
//! SnapVault captures photos and short videos from a camera, uploads them to
//! a media backend and browses what has been stored there.
//!
//! ## Key Features
//!
//! - **One capture session**: a single state machine owns the camera stream,
//!   the recorder and the pending artifact
//! - **Codec fallback**: recordings prefer VP9 WebM and fall back to the
//!   device default
//! - **Pluggable devices**: any [`DeviceMediaSource`] works; a mock camera is
//!   included for tests and demos
//! - **Gallery**: list, filter and delete uploaded media
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use snapvault::{MockDeviceSource, SnapVault};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let snapvault = SnapVault::init()?;
//!
//!     let camera = snapvault
//!         .capture()
//!         .device(Arc::new(MockDeviceSource::new()))
//!         .on_upload_success(|info| println!("stored {}", info.filename))
//!         .build()?;
//!
//!     camera.start_camera().await;
//!     camera.capture_photo().await;
//!     let snapshot = camera.upload().await;
//!     println!("{}", snapshot.status.message);
//!
//!     let mut gallery = snapvault.gallery();
//!     gallery.refresh().await;
//!     Ok(())
//! }
//! ```

#![deny(missing_docs)]
#![warn(clippy::all)]

// Re-export core types for easy access
pub use snapvault_core::{
    transition, Artifact, ArtifactInfo, CaptureMode, DeviceAccessKind, Effect, ErrorCategory,
    FacingMode, MediaConstraints, MediaKind, Session, SessionEvent, SessionState, SnapVaultError,
    SnapVaultResult, Status, StatusKind, Step, VideoConstraints,
};

pub use snapvault_media::{
    BlobUrl, BlobUrlManager, DeviceMediaSource, InMemoryBlobUrls, MediaError, MediaStream,
    MockDeviceConfig, MockDeviceSource,
};

pub use snapvault_api::{
    ApiError, MediaApiClient, MediaCatalog, MediaFile, MediaFilter, UploadOutcome, UploadService,
};

// Public API modules
pub mod config;
pub mod controller;
pub mod event;
pub mod gallery;
pub mod logging;

// Re-export main API types
pub use config::{CaptureConfig, GlobalConfig};
pub use controller::{CaptureController, CaptureControllerBuilder, SessionSnapshot};
pub use event::{Event, EventStream};
pub use gallery::{format_file_size, Gallery};
pub use logging::init_logging;

use std::sync::Arc;

/// Main entry point for SnapVault
#[derive(Debug, Clone)]
pub struct SnapVault {
    inner: Arc<SnapVaultInner>,
}

#[derive(Debug)]
struct SnapVaultInner {
    config: GlobalConfig,
    client: Arc<MediaApiClient>,
}

impl SnapVault {
    /// Initialize SnapVault with default settings
    ///
    /// # Example
    /// ```rust,no_run
    /// use snapvault::SnapVault;
    ///
    /// let snapvault = SnapVault::init()?;
    /// # Ok::<(), snapvault::SnapVaultError>(())
    /// ```
    pub fn init() -> SnapVaultResult<Self> {
        Self::init_with(GlobalConfig::default())
    }

    /// Initialize with custom global configuration
    pub fn init_with(config: GlobalConfig) -> SnapVaultResult<Self> {
        let client = MediaApiClient::with_timeout(&config.api_base_url, config.request_timeout)
            .map_err(|e| SnapVaultError::Initialization {
                reason: format!("Failed to create API client: {}", e),
            })?;
        tracing::debug!(api = %client.base_url(), "snapvault initialized");

        Ok(Self {
            inner: Arc::new(SnapVaultInner {
                config,
                client: Arc::new(client),
            }),
        })
    }

    /// Active configuration
    pub fn config(&self) -> &GlobalConfig {
        &self.inner.config
    }

    /// Backend client shared by capture and gallery
    pub fn client(&self) -> &MediaApiClient {
        &self.inner.client
    }

    /// Controller builder that uploads to the configured backend.
    /// A device source must still be supplied.
    pub fn capture(&self) -> CaptureControllerBuilder {
        CaptureControllerBuilder::new().uploader(self.inner.client.clone())
    }

    /// Gallery over the configured backend
    pub fn gallery(&self) -> Gallery {
        Gallery::new(self.inner.client.clone())
    }
}
