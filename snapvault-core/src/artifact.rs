//! Captured media waiting for upload

use crate::mode::MediaKind;
use bytes::Bytes;
use chrono::{DateTime, Utc};

/// Content type of every recorded clip
pub const VIDEO_CONTENT_TYPE: &str = "video/webm";
/// Content type of every captured photo
pub const PHOTO_CONTENT_TYPE: &str = "image/jpeg";

/// An encoded photo or clip held in memory until it is uploaded or discarded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    kind: MediaKind,
    bytes: Bytes,
    filename: String,
    captured_at: DateTime<Utc>,
}

impl Artifact {
    /// JPEG photo named `photo_<unix_ms>.jpg`
    pub fn photo(bytes: impl Into<Bytes>, captured_at: DateTime<Utc>) -> Self {
        Self {
            kind: MediaKind::Image,
            bytes: bytes.into(),
            filename: format!("photo_{}.jpg", captured_at.timestamp_millis()),
            captured_at,
        }
    }

    /// WebM clip named `video_<unix_ms>.webm`
    pub fn video(bytes: impl Into<Bytes>, captured_at: DateTime<Utc>) -> Self {
        Self {
            kind: MediaKind::Video,
            bytes: bytes.into(),
            filename: format!("video_{}.webm", captured_at.timestamp_millis()),
            captured_at,
        }
    }

    /// Image or video
    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    /// Encoded payload. Cloning shares the buffer.
    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    /// Generated upload filename
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// MIME type sent with the upload
    pub fn content_type(&self) -> &'static str {
        match self.kind {
            MediaKind::Image => PHOTO_CONTENT_TYPE,
            MediaKind::Video => VIDEO_CONTENT_TYPE,
        }
    }

    /// When the capture finished
    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    /// Payload size in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the payload is empty
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Lightweight description without the payload
    pub fn info(&self) -> ArtifactInfo {
        ArtifactInfo {
            kind: self.kind,
            filename: self.filename.clone(),
            size: self.bytes.len(),
        }
    }
}

/// Summary of a pending artifact for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactInfo {
    /// Image or video
    pub kind: MediaKind,
    /// Generated upload filename
    pub filename: String,
    /// Payload size in bytes
    pub size: usize,
}
