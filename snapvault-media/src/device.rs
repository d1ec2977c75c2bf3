//! Device media source capability

use crate::error::MediaResult;
use crate::stream::MediaStream;
use async_trait::async_trait;
use snapvault_core::MediaConstraints;

/// Grants camera/microphone streams.
///
/// Browser builds wrap `getUserMedia`; native builds wrap the platform
/// camera stack; tests use [`MockDeviceSource`](crate::mock::MockDeviceSource).
#[async_trait]
pub trait DeviceMediaSource: Send + Sync {
    /// Request a stream. Fails with [`MediaError::DeviceAccess`](crate::MediaError::DeviceAccess)
    /// when permission is refused, no device exists or the constraints
    /// cannot be met.
    async fn acquire(&self, constraints: &MediaConstraints) -> MediaResult<MediaStream>;

    /// Give a stream back, stopping all of its tracks
    fn release(&self, stream: MediaStream) {
        stream.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracks::{MediaTrack, TrackKind, VideoFrame, VideoResolution};
    use crate::{ChunkEncoder, FrameSource, MediaError};
    use snapvault_core::{CaptureMode, VideoConstraints};
    use std::sync::Arc;

    struct StillSource;

    impl FrameSource for StillSource {
        fn resolution(&self) -> VideoResolution {
            VideoResolution::VGA
        }

        fn current_frame(&self) -> MediaResult<VideoFrame> {
            Err(MediaError::CaptureNotActive)
        }

        fn open_encoder(
            &self,
            mime_type: Option<&str>,
            _with_audio: bool,
        ) -> MediaResult<Box<dyn ChunkEncoder>> {
            Err(MediaError::UnsupportedCodec {
                mime_type: mime_type.unwrap_or_default().to_string(),
            })
        }
    }

    struct SingleCamera;

    #[async_trait]
    impl DeviceMediaSource for SingleCamera {
        async fn acquire(&self, _constraints: &MediaConstraints) -> MediaResult<MediaStream> {
            Ok(MediaStream::new(
                vec![MediaTrack::new(TrackKind::Video, "Front Camera")],
                Arc::new(StillSource),
            ))
        }
    }

    #[test]
    fn test_default_release_stops_tracks() {
        let constraints = MediaConstraints::for_mode(CaptureMode::Photo, VideoConstraints::default());
        let stream = tokio_test::block_on(SingleCamera.acquire(&constraints)).unwrap();
        let probe = stream.tracks()[0].probe();
        assert!(probe.is_live());

        SingleCamera.release(stream);
        assert!(!probe.is_live());
    }
}
