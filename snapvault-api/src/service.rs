//! Capabilities the capture and gallery layers consume

use crate::error::ApiResult;
use crate::protocol::{MediaFile, MediaFilter, UploadResponse};
use async_trait::async_trait;
use bytes::Bytes;
use snapvault_core::MediaKind;

/// Outcome reported by the upload service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOutcome {
    /// Whether the service stored the file
    pub success: bool,
    /// Service supplied message
    pub message: Option<String>,
}

impl From<UploadResponse> for UploadOutcome {
    fn from(response: UploadResponse) -> Self {
        Self {
            success: response.success,
            message: response.message,
        }
    }
}

/// Accepts captured media.
///
/// `Err` means the service could not be reached or answered nonsense;
/// a reachable service that refuses the file answers `Ok` with
/// `success: false`.
#[async_trait]
pub trait UploadService: Send + Sync {
    /// Upload a JPEG photo
    async fn upload_photo(&self, bytes: Bytes, filename: &str) -> ApiResult<UploadOutcome>;

    /// Upload a WebM clip
    async fn upload_video(&self, bytes: Bytes, filename: &str) -> ApiResult<UploadOutcome>;

    /// Dispatch on media kind
    async fn upload(&self, kind: MediaKind, bytes: Bytes, filename: &str) -> ApiResult<UploadOutcome> {
        match kind {
            MediaKind::Image => self.upload_photo(bytes, filename).await,
            MediaKind::Video => self.upload_video(bytes, filename).await,
        }
    }
}

/// Browses and deletes stored media
#[async_trait]
pub trait MediaCatalog: Send + Sync {
    /// List stored media passing `filter`
    async fn list(&self, filter: MediaFilter) -> ApiResult<Vec<MediaFile>>;

    /// Delete one stored file
    async fn delete(&self, id: i64) -> ApiResult<UploadOutcome>;
}
