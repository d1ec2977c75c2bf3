//! Chunked video recording with codec fallback
//!
//! A [`MediaRecorder`] wraps one [`ChunkEncoder`] opened on a stream. It asks
//! for the preferred codec first and quietly settles for the platform
//! default if that is refused. Encoded output arrives as a sequence of
//! chunks; empty chunks are dropped and the rest are joined into a single
//! clip when recording stops.

use crate::error::{MediaError, MediaResult};
use crate::stream::MediaStream;
use bytes::{Bytes, BytesMut};
use tracing::{debug, info, warn};

/// Codec profile asked for first
pub const PREFERRED_VIDEO_MIME: &str = "video/webm;codecs=vp9";
/// Container type of every finished clip
pub const DEFAULT_VIDEO_MIME: &str = "video/webm";

/// Platform encoder producing sequential binary chunks
pub trait ChunkEncoder: Send {
    /// MIME type actually in use
    fn mime_type(&self) -> &str;

    /// Begin encoding
    fn start(&mut self) -> MediaResult<()>;

    /// Chunks produced since the last call
    fn poll_chunks(&mut self) -> MediaResult<Vec<Bytes>>;

    /// Stop encoding and flush the remaining chunks
    fn finish(&mut self) -> MediaResult<Vec<Bytes>>;

    /// Stop encoding and drop anything unflushed
    fn abort(&mut self);
}

/// Recorder configuration
#[derive(Debug, Clone)]
pub struct RecorderOptions {
    /// Codec to try first; `None` goes straight to the platform default
    pub preferred_mime: Option<String>,
}

impl Default for RecorderOptions {
    fn default() -> Self {
        Self {
            preferred_mime: Some(PREFERRED_VIDEO_MIME.to_string()),
        }
    }
}

/// A finished recording
#[derive(Debug, Clone)]
pub struct RecordedClip {
    /// Joined chunk payloads
    pub bytes: Bytes,
    /// Encoder MIME type
    pub mime_type: String,
    /// Number of non-empty chunks joined
    pub chunk_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RecorderState {
    Recording,
    Inactive,
}

/// Records one clip from a stream
pub struct MediaRecorder {
    encoder: Box<dyn ChunkEncoder>,
    chunks: Vec<Bytes>,
    state: RecorderState,
    fell_back: bool,
}

impl std::fmt::Debug for MediaRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaRecorder")
            .field("mime_type", &self.encoder.mime_type())
            .field("chunks", &self.chunks.len())
            .field("state", &self.state)
            .field("fell_back", &self.fell_back)
            .finish()
    }
}

impl MediaRecorder {
    /// Open an encoder on `stream` and start recording
    pub fn start(stream: &MediaStream, options: &RecorderOptions) -> MediaResult<Self> {
        let (encoder, fell_back) = match options.preferred_mime.as_deref() {
            Some(preferred) => match Self::open(stream, Some(preferred)) {
                Ok(encoder) => (encoder, false),
                Err(e) => {
                    warn!(preferred, error = %e, "preferred codec refused, using default");
                    (Self::open(stream, None)?, true)
                }
            },
            None => (Self::open(stream, None)?, false),
        };

        info!(stream = %stream.id(), mime = encoder.mime_type(), fell_back, "recording started");
        Ok(Self {
            encoder,
            chunks: Vec::new(),
            state: RecorderState::Recording,
            fell_back,
        })
    }

    fn open(stream: &MediaStream, mime: Option<&str>) -> MediaResult<Box<dyn ChunkEncoder>> {
        let mut encoder = stream.open_encoder(mime)?;
        encoder.start()?;
        Ok(encoder)
    }

    /// MIME type in use
    pub fn mime_type(&self) -> &str {
        self.encoder.mime_type()
    }

    /// Whether the default codec replaced the preferred one
    pub fn used_fallback(&self) -> bool {
        self.fell_back
    }

    /// Whether the recorder is still running
    pub fn is_recording(&self) -> bool {
        self.state == RecorderState::Recording
    }

    /// Non-empty chunks buffered so far
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Bytes buffered so far
    pub fn buffered_bytes(&self) -> usize {
        self.chunks.iter().map(Bytes::len).sum()
    }

    fn buffer(&mut self, chunks: Vec<Bytes>) -> usize {
        let before = self.chunks.len();
        self.chunks.extend(chunks.into_iter().filter(|c| !c.is_empty()));
        self.chunks.len() - before
    }

    /// Pull available chunks from the encoder. Returns how many were kept.
    pub fn pump(&mut self) -> MediaResult<usize> {
        if self.state != RecorderState::Recording {
            return Err(MediaError::InvalidState {
                message: "recorder is not running".to_string(),
            });
        }
        let chunks = self.encoder.poll_chunks()?;
        Ok(self.buffer(chunks))
    }

    /// Stop recording and join everything into one clip
    pub fn stop(mut self) -> MediaResult<RecordedClip> {
        self.state = RecorderState::Inactive;
        let pending = self.encoder.poll_chunks().and_then(|mut chunks| {
            chunks.extend(self.encoder.finish()?);
            Ok(chunks)
        });
        let tail = match pending {
            Ok(chunks) => chunks,
            Err(e) => {
                self.encoder.abort();
                return Err(e);
            }
        };
        self.buffer(tail);

        let mut joined = BytesMut::with_capacity(self.buffered_bytes());
        for chunk in &self.chunks {
            joined.extend_from_slice(chunk);
        }
        let clip = RecordedClip {
            bytes: joined.freeze(),
            mime_type: self.encoder.mime_type().to_string(),
            chunk_count: self.chunks.len(),
        };
        info!(bytes = clip.bytes.len(), chunks = clip.chunk_count, "recording finished");
        Ok(clip)
    }

    /// Stop recording and throw the output away
    pub fn discard(mut self) {
        self.state = RecorderState::Inactive;
        self.encoder.abort();
        debug!(chunks = self.chunks.len(), "recording discarded");
        self.chunks.clear();
    }
}

impl Drop for MediaRecorder {
    fn drop(&mut self) {
        if self.state == RecorderState::Recording {
            self.encoder.abort();
        }
    }
}
