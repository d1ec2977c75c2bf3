//! Acquired device streams

use crate::error::{MediaError, MediaResult};
use crate::recorder::ChunkEncoder;
use crate::tracks::{MediaTrack, TrackKind, VideoFrame, VideoResolution};
use std::sync::Arc;
use tracing::debug;

/// Platform side of an acquired stream: the live preview sink and the
/// encoder factory used for recording.
pub trait FrameSource: Send + Sync {
    /// Native resolution the device is delivering
    fn resolution(&self) -> VideoResolution;

    /// Most recent preview frame at native resolution
    fn current_frame(&self) -> MediaResult<VideoFrame>;

    /// Open an encoder for the stream. `None` selects the platform default.
    fn open_encoder(
        &self,
        mime_type: Option<&str>,
        with_audio: bool,
    ) -> MediaResult<Box<dyn ChunkEncoder>>;
}

/// An acquired audio/video input.
///
/// Every track is stopped exactly once: either by [`MediaStream::stop`]
/// or, if the owner never got that far, when the stream is dropped.
pub struct MediaStream {
    id: String,
    tracks: Vec<MediaTrack>,
    source: Arc<dyn FrameSource>,
}

impl std::fmt::Debug for MediaStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaStream")
            .field("id", &self.id)
            .field("tracks", &self.tracks)
            .field("resolution", &self.source.resolution())
            .finish()
    }
}

impl MediaStream {
    /// Wrap tracks granted by a device source
    pub fn new(tracks: Vec<MediaTrack>, source: Arc<dyn FrameSource>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            tracks,
            source,
        }
    }

    /// Stream ID
    pub fn id(&self) -> &str {
        &self.id
    }

    /// All tracks, live or not
    pub fn tracks(&self) -> &[MediaTrack] {
        &self.tracks
    }

    /// Whether a microphone track was granted
    pub fn has_audio(&self) -> bool {
        self.tracks.iter().any(|t| t.kind() == TrackKind::Audio)
    }

    /// Number of tracks still holding hardware
    pub fn live_track_count(&self) -> usize {
        self.tracks.iter().filter(|t| t.is_live()).count()
    }

    /// Native resolution of the video track
    pub fn resolution(&self) -> VideoResolution {
        self.source.resolution()
    }

    fn video_live(&self) -> bool {
        self.tracks
            .iter()
            .any(|t| t.kind() == TrackKind::Video && t.is_live())
    }

    /// Grab the current preview frame
    pub fn snapshot(&self) -> MediaResult<VideoFrame> {
        if !self.video_live() {
            return Err(MediaError::CaptureNotActive);
        }
        self.source.current_frame()
    }

    /// Open an encoder over this stream's tracks
    pub fn open_encoder(&self, mime_type: Option<&str>) -> MediaResult<Box<dyn ChunkEncoder>> {
        if !self.video_live() {
            return Err(MediaError::CaptureNotActive);
        }
        self.source.open_encoder(mime_type, self.has_audio())
    }

    /// Stop every live track. Returns how many were stopped by this call.
    pub fn stop(&self) -> usize {
        let stopped = self.tracks.iter().filter(|t| t.stop()).count();
        if stopped > 0 {
            debug!(stream = %self.id, stopped, "stream stopped");
        }
        stopped
    }
}

impl Drop for MediaStream {
    fn drop(&mut self) {
        let stopped = self.stop();
        if stopped > 0 {
            debug!(stream = %self.id, stopped, "stream dropped while live");
        }
    }
}
