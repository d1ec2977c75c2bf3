//! Integration tests for device acquisition, photo capture and recording
//!
//! Everything runs against the mock device source, so no camera hardware is
//! needed.

use snapvault_core::{CaptureMode, DeviceAccessKind, MediaConstraints, VideoConstraints};
use snapvault_media::*;

fn constraints(mode: CaptureMode) -> MediaConstraints {
    MediaConstraints::for_mode(mode, VideoConstraints::default())
}

// ============================================================================
// DEVICE LIFECYCLE TESTS
// ============================================================================

#[tokio::test]
async fn test_photo_mode_requests_video_only() {
    let device = MockDeviceSource::new();
    let stream = device.acquire(&constraints(CaptureMode::Photo)).await.unwrap();

    assert_eq!(stream.tracks().len(), 1);
    assert!(!stream.has_audio());
    assert_eq!(device.acquisitions(), 1);
    assert_eq!(device.live_tracks(), 1);
    assert_eq!(device.last_constraints().map(|c| c.audio), Some(false));

    device.release(stream);
    assert_eq!(device.releases(), 1);
    assert_eq!(device.live_tracks(), 0);
}

#[tokio::test]
async fn test_video_mode_adds_audio_track() {
    let device = MockDeviceSource::new();
    let stream = device.acquire(&constraints(CaptureMode::Video)).await.unwrap();

    assert!(stream.has_audio());
    assert_eq!(stream.live_track_count(), 2);
    assert_eq!(stream.stop(), 2);
    assert_eq!(stream.stop(), 0);
    assert_eq!(device.live_tracks(), 0);
}

#[tokio::test]
async fn test_dropped_stream_stops_tracks() {
    let device = MockDeviceSource::new();
    {
        let _stream = device.acquire(&constraints(CaptureMode::Video)).await.unwrap();
        assert_eq!(device.live_tracks(), 2);
    }
    assert_eq!(device.live_tracks(), 0);
}

#[tokio::test]
async fn test_denied_access() {
    let device = MockDeviceSource::failing(DeviceAccessKind::PermissionDenied);
    let err = device
        .acquire(&constraints(CaptureMode::Photo))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        MediaError::DeviceAccess {
            kind: DeviceAccessKind::PermissionDenied,
            ..
        }
    ));
    assert_eq!(device.acquisitions(), 0);
    assert_eq!(device.live_tracks(), 0);
}

// ============================================================================
// PHOTO CAPTURE TESTS
// ============================================================================

#[tokio::test]
async fn test_snapshot_at_native_resolution() {
    let device = MockDeviceSource::with_config(MockDeviceConfig {
        resolution: VideoResolution::new(320, 240),
        ..MockDeviceConfig::default()
    });
    let stream = device.acquire(&constraints(CaptureMode::Photo)).await.unwrap();

    let frame = stream.snapshot().unwrap();
    assert_eq!(frame.resolution(), VideoResolution::new(320, 240));
    assert_eq!(frame.data.len(), frame.expected_len());

    let jpeg = PhotoEncoder::default().encode(&frame).unwrap();
    assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
}

#[tokio::test]
async fn test_snapshot_after_stop_fails() {
    let device = MockDeviceSource::new();
    let stream = device.acquire(&constraints(CaptureMode::Photo)).await.unwrap();
    stream.stop();

    assert!(matches!(
        stream.snapshot(),
        Err(MediaError::CaptureNotActive)
    ));
}

// ============================================================================
// RECORDING TESTS
// ============================================================================

#[tokio::test]
async fn test_recorder_uses_preferred_codec() {
    let device = MockDeviceSource::new();
    let stream = device.acquire(&constraints(CaptureMode::Video)).await.unwrap();

    let mut recorder = MediaRecorder::start(&stream, &RecorderOptions::default()).unwrap();
    assert_eq!(recorder.mime_type(), PREFERRED_VIDEO_MIME);
    assert!(!recorder.used_fallback());

    // empty chunks are dropped
    assert_eq!(recorder.pump().unwrap(), 1);
    assert_eq!(recorder.pump().unwrap(), 1);

    let clip = recorder.stop().unwrap();
    assert_eq!(clip.chunk_count, 4);
    assert_eq!(
        clip.bytes.as_ref(),
        b"[video/webm;codecs=vp9:1][video/webm;codecs=vp9:2][video/webm;codecs=vp9:3][video/webm;codecs=vp9:end]"
    );
}

#[tokio::test]
async fn test_recorder_falls_back_to_default_codec() {
    let device = MockDeviceSource::with_config(MockDeviceConfig {
        rejected_mimes: vec![PREFERRED_VIDEO_MIME.to_string()],
        ..MockDeviceConfig::default()
    });
    let stream = device.acquire(&constraints(CaptureMode::Video)).await.unwrap();

    let recorder = MediaRecorder::start(&stream, &RecorderOptions::default()).unwrap();
    assert!(recorder.used_fallback());
    assert_eq!(recorder.mime_type(), DEFAULT_VIDEO_MIME);

    let clip = recorder.stop().unwrap();
    assert_eq!(clip.mime_type, DEFAULT_VIDEO_MIME);
    assert!(!clip.bytes.is_empty());
}

#[tokio::test]
async fn test_recorder_surfaces_error_when_no_codec_works() {
    let device = MockDeviceSource::with_config(MockDeviceConfig {
        fail_encoder: true,
        ..MockDeviceConfig::default()
    });
    let stream = device.acquire(&constraints(CaptureMode::Video)).await.unwrap();

    let err = MediaRecorder::start(&stream, &RecorderOptions::default()).unwrap_err();
    assert!(matches!(err, MediaError::EncodingFailed { .. }));
}

#[tokio::test]
async fn test_discarded_recording() {
    let device = MockDeviceSource::new();
    let stream = device.acquire(&constraints(CaptureMode::Video)).await.unwrap();

    let mut recorder = MediaRecorder::start(&stream, &RecorderOptions::default()).unwrap();
    recorder.pump().unwrap();
    assert!(recorder.buffered_bytes() > 0);
    recorder.discard();

    // stream is unaffected by the recorder going away
    assert_eq!(stream.live_track_count(), 2);
}

#[tokio::test]
async fn test_preview_url_for_clip() {
    let device = MockDeviceSource::new();
    let stream = device.acquire(&constraints(CaptureMode::Video)).await.unwrap();
    let clip = MediaRecorder::start(&stream, &RecorderOptions::default())
        .unwrap()
        .stop()
        .unwrap();

    let urls = InMemoryBlobUrls::default();
    let url = urls.create(clip.bytes.clone(), DEFAULT_VIDEO_MIME);
    assert_eq!(urls.resolve(&url).unwrap().0, clip.bytes);
    assert!(urls.revoke(&url));
    assert_eq!(urls.live_count(), 0);
}
