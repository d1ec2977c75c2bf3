//! Mock device source for testing and headless runs
//!
//! Produces a synthetic camera with a moving gradient and an encoder that
//! emits small labelled chunks. It can be told to refuse access, to refuse
//! particular codecs, or to fail encoding, and it keeps count of what was
//! acquired and released so tests can check for leaked tracks.

use crate::device::DeviceMediaSource;
use crate::error::{MediaError, MediaResult};
use crate::recorder::{ChunkEncoder, DEFAULT_VIDEO_MIME};
use crate::stream::{FrameSource, MediaStream};
use crate::tracks::{MediaTrack, TrackKind, TrackProbe, VideoFrame, VideoPixelFormat, VideoResolution};
use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use snapvault_core::{DeviceAccessKind, MediaConstraints};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Behaviour of a [`MockDeviceSource`]
#[derive(Debug, Clone)]
pub struct MockDeviceConfig {
    /// Refuse every acquisition with this error
    pub failure: Option<DeviceAccessKind>,
    /// Native resolution of the synthetic camera
    pub resolution: VideoResolution,
    /// Codecs the encoder refuses
    pub rejected_mimes: Vec<String>,
    /// Refuse every encoder, including the default
    pub fail_encoder: bool,
    /// Encoder errors on every poll after this many
    pub fail_after_polls: Option<u32>,
    /// Delay before answering an acquisition
    pub acquire_delay: Option<Duration>,
}

impl Default for MockDeviceConfig {
    fn default() -> Self {
        Self {
            failure: None,
            resolution: VideoResolution::VGA,
            rejected_mimes: Vec::new(),
            fail_encoder: false,
            fail_after_polls: None,
            acquire_delay: None,
        }
    }
}

/// Virtual camera and microphone
#[derive(Debug, Default)]
pub struct MockDeviceSource {
    config: Mutex<MockDeviceConfig>,
    acquisitions: AtomicUsize,
    releases: AtomicUsize,
    probes: Mutex<Vec<TrackProbe>>,
    last_constraints: Mutex<Option<MediaConstraints>>,
}

impl MockDeviceSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: MockDeviceConfig) -> Self {
        Self {
            config: Mutex::new(config),
            ..Self::default()
        }
    }

    /// Source that refuses access with `kind`
    pub fn failing(kind: DeviceAccessKind) -> Self {
        Self::with_config(MockDeviceConfig {
            failure: Some(kind),
            ..MockDeviceConfig::default()
        })
    }

    /// Change behaviour for later acquisitions
    pub fn set_failure(&self, failure: Option<DeviceAccessKind>) {
        self.config.lock().failure = failure;
    }

    /// Number of streams granted
    pub fn acquisitions(&self) -> usize {
        self.acquisitions.load(Ordering::SeqCst)
    }

    /// Number of streams handed back through [`DeviceMediaSource::release`]
    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }

    /// Tracks still live across every stream ever granted
    pub fn live_tracks(&self) -> usize {
        self.probes.lock().iter().filter(|p| p.is_live()).count()
    }

    /// Constraints of the most recent request
    pub fn last_constraints(&self) -> Option<MediaConstraints> {
        *self.last_constraints.lock()
    }
}

#[async_trait]
impl DeviceMediaSource for MockDeviceSource {
    async fn acquire(&self, constraints: &MediaConstraints) -> MediaResult<MediaStream> {
        *self.last_constraints.lock() = Some(*constraints);
        let config = self.config.lock().clone();

        if let Some(delay) = config.acquire_delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(kind) = config.failure {
            return Err(MediaError::DeviceAccess {
                kind,
                reason: format!("mock device refused: {}", kind),
            });
        }

        let mut tracks = vec![MediaTrack::new(TrackKind::Video, "Mock Camera")];
        if constraints.audio {
            tracks.push(MediaTrack::new(TrackKind::Audio, "Mock Microphone"));
        }
        self.probes
            .lock()
            .extend(tracks.iter().map(MediaTrack::probe));
        self.acquisitions.fetch_add(1, Ordering::SeqCst);

        let source = Arc::new(MockFrameSource {
            resolution: config.resolution,
            rejected_mimes: config.rejected_mimes,
            fail_encoder: config.fail_encoder,
            fail_after_polls: config.fail_after_polls,
            frames: AtomicU64::new(0),
        });
        Ok(MediaStream::new(tracks, source))
    }

    fn release(&self, stream: MediaStream) {
        stream.stop();
        self.releases.fetch_add(1, Ordering::SeqCst);
    }
}

struct MockFrameSource {
    resolution: VideoResolution,
    rejected_mimes: Vec<String>,
    fail_encoder: bool,
    fail_after_polls: Option<u32>,
    frames: AtomicU64,
}

impl FrameSource for MockFrameSource {
    fn resolution(&self) -> VideoResolution {
        self.resolution
    }

    fn current_frame(&self) -> MediaResult<VideoFrame> {
        let n = self.frames.fetch_add(1, Ordering::Relaxed);
        let VideoResolution { width, height } = self.resolution;
        let mut data = Vec::with_capacity(self.resolution.pixel_count() * 3);
        for y in 0..height {
            for x in 0..width {
                data.push(((x as u64 + n) % 256) as u8);
                data.push((y % 256) as u8);
                data.push(((x + y) % 256) as u8);
            }
        }
        Ok(VideoFrame {
            width,
            height,
            format: VideoPixelFormat::RGB24,
            data,
            timestamp: n * 33,
        })
    }

    fn open_encoder(
        &self,
        mime_type: Option<&str>,
        _with_audio: bool,
    ) -> MediaResult<Box<dyn ChunkEncoder>> {
        if self.fail_encoder {
            return Err(MediaError::EncodingFailed {
                codec: mime_type.unwrap_or(DEFAULT_VIDEO_MIME).to_string(),
                reason: "mock encoder unavailable".to_string(),
            });
        }
        if let Some(mime) = mime_type {
            if self.rejected_mimes.iter().any(|m| m == mime) {
                return Err(MediaError::UnsupportedCodec {
                    mime_type: mime.to_string(),
                });
            }
        }
        Ok(Box::new(MockChunkEncoder {
            mime_type: mime_type.unwrap_or(DEFAULT_VIDEO_MIME).to_string(),
            sequence: 0,
            fail_after: self.fail_after_polls,
            running: false,
        }))
    }
}

/// Emits `[<mime>:<n>]` per poll, an empty chunk alongside, and
/// `[<mime>:end]` on finish
struct MockChunkEncoder {
    mime_type: String,
    sequence: u32,
    fail_after: Option<u32>,
    running: bool,
}

impl ChunkEncoder for MockChunkEncoder {
    fn mime_type(&self) -> &str {
        &self.mime_type
    }

    fn start(&mut self) -> MediaResult<()> {
        self.running = true;
        Ok(())
    }

    fn poll_chunks(&mut self) -> MediaResult<Vec<Bytes>> {
        if !self.running {
            return Ok(Vec::new());
        }
        if self.fail_after.is_some_and(|limit| self.sequence >= limit) {
            return Err(MediaError::EncodingFailed {
                codec: self.mime_type.clone(),
                reason: "mock encoder stalled".to_string(),
            });
        }
        self.sequence += 1;
        Ok(vec![
            Bytes::from(format!("[{}:{}]", self.mime_type, self.sequence)),
            Bytes::new(),
        ])
    }

    fn finish(&mut self) -> MediaResult<Vec<Bytes>> {
        if !self.running {
            return Err(MediaError::InvalidState {
                message: "encoder not running".to_string(),
            });
        }
        self.running = false;
        Ok(vec![Bytes::from(format!("[{}:end]", self.mime_type))])
    }

    fn abort(&mut self) {
        self.running = false;
    }
}
