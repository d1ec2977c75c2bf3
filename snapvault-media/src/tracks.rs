//! Track abstractions and media frame types

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Supported raw pixel formats for captured frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VideoPixelFormat {
    RGB24,
    RGBA32,
}

impl VideoPixelFormat {
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            VideoPixelFormat::RGB24 => 3,
            VideoPixelFormat::RGBA32 => 4,
        }
    }
}

/// Video resolution information
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VideoResolution {
    pub width: u32,
    pub height: u32,
}

impl VideoResolution {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub const HD: Self = Self::new(1280, 720);
    pub const FULL_HD: Self = Self::new(1920, 1080);
    pub const VGA: Self = Self::new(640, 480);

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Raw video frame grabbed from the live preview
#[derive(Debug, Clone)]
pub struct VideoFrame {
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Pixel layout of `data`
    pub format: VideoPixelFormat,
    /// Packed pixel rows
    pub data: Vec<u8>,
    /// Timestamp in milliseconds
    pub timestamp: u64,
}

impl VideoFrame {
    /// Byte length `data` must have for this frame's size and format
    pub fn expected_len(&self) -> usize {
        VideoResolution::new(self.width, self.height).pixel_count()
            * self.format.bytes_per_pixel()
    }

    /// Frame dimensions
    pub fn resolution(&self) -> VideoResolution {
        VideoResolution::new(self.width, self.height)
    }
}

/// Kind of media a track carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackKind {
    /// Microphone input
    Audio,
    /// Camera input
    Video,
}

/// One hardware input of a stream.
///
/// A track is live until stopped; stopping is idempotent and only the
/// first call actually ends the track.
#[derive(Debug)]
pub struct MediaTrack {
    id: String,
    kind: TrackKind,
    label: String,
    live: Arc<AtomicBool>,
}

impl MediaTrack {
    /// Create a live track
    pub fn new(kind: TrackKind, label: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            label: label.into(),
            live: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Track ID
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Audio or video
    pub fn kind(&self) -> TrackKind {
        self.kind
    }

    /// Device label
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Whether the track still holds the device
    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }

    /// End the track. Returns true only for the call that actually ended it.
    pub fn stop(&self) -> bool {
        let was_live = self.live.swap(false, Ordering::AcqRel);
        if was_live {
            tracing::debug!(track = %self.id, kind = ?self.kind, "track stopped");
        }
        was_live
    }

    /// Observer that outlives the track, for sources that report liveness
    pub fn probe(&self) -> TrackProbe {
        TrackProbe {
            id: self.id.clone(),
            kind: self.kind,
            live: Arc::clone(&self.live),
        }
    }
}

/// Read-only view of a track's liveness
#[derive(Debug, Clone)]
pub struct TrackProbe {
    id: String,
    kind: TrackKind,
    live: Arc<AtomicBool>,
}

impl TrackProbe {
    /// Track ID
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Audio or video
    pub fn kind(&self) -> TrackKind {
        self.kind
    }

    /// Whether the observed track is still live
    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_stops_once() {
        let track = MediaTrack::new(TrackKind::Video, "Test Camera");
        let probe = track.probe();
        assert!(probe.is_live());

        assert!(track.stop());
        assert!(!track.stop());
        assert!(!probe.is_live());
    }

    #[test]
    fn test_frame_expected_len() {
        let frame = VideoFrame {
            width: 4,
            height: 2,
            format: VideoPixelFormat::RGBA32,
            data: vec![0; 32],
            timestamp: 0,
        };
        assert_eq!(frame.expected_len(), 32);
        assert_eq!(frame.resolution(), VideoResolution::new(4, 2));
    }
}
