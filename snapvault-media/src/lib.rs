//! # SnapVault Media
//!
//! Everything that touches capture hardware, or stands in for it: the device
//! media source capability, streams and their tracks, still photo encoding,
//! chunked recording with codec fallback, and preview URL bookkeeping.

#![warn(clippy::all)]

pub mod blob_url;
pub mod device;
pub mod error;
pub mod mock;
pub mod photo;
pub mod recorder;
pub mod stream;
pub mod tracks;

// Re-export main types
pub use blob_url::{BlobUrl, BlobUrlManager, InMemoryBlobUrls};
pub use device::DeviceMediaSource;
pub use error::{ErrorCategory, MediaError, MediaResult};
pub use mock::{MockDeviceConfig, MockDeviceSource};
pub use photo::{PhotoEncoder, DEFAULT_JPEG_QUALITY};
pub use recorder::{
    ChunkEncoder, MediaRecorder, RecordedClip, RecorderOptions, DEFAULT_VIDEO_MIME,
    PREFERRED_VIDEO_MIME,
};
pub use stream::{FrameSource, MediaStream};
pub use tracks::{MediaTrack, TrackKind, TrackProbe, VideoFrame, VideoPixelFormat, VideoResolution};
