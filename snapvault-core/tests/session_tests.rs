//! State machine tests for the capture session
//!
//! These drive the session purely through events, playing the part of the
//! adapter by answering effects by hand.

use chrono::Utc;
use snapvault_core::session::{PHOTO_UPLOADED, UPLOADING, VIDEO_RECORDED, VIDEO_UPLOADED};
use snapvault_core::*;

// ============================================================================
// HELPERS
// ============================================================================

fn camera_on(mode: CaptureMode) -> Session {
    let mut session = Session::new(mode);
    session.apply(SessionEvent::StartCamera).unwrap();
    let ticket = session.awaiting_device().unwrap();
    session
        .apply(SessionEvent::DeviceAcquired { ticket })
        .unwrap();
    assert_eq!(session.state(), SessionState::CameraOn);
    session
}

fn with_photo(bytes: &[u8]) -> Session {
    let mut session = camera_on(CaptureMode::Photo);
    session.apply(SessionEvent::CapturePhoto).unwrap();
    session
        .apply(SessionEvent::PhotoCaptured(Artifact::photo(bytes.to_vec(), Utc::now())))
        .unwrap();
    session
}

fn with_video(bytes: &[u8]) -> Session {
    let mut session = camera_on(CaptureMode::Video);
    session.apply(SessionEvent::StartRecording).unwrap();
    session.apply(SessionEvent::StopRecording).unwrap();
    session
        .apply(SessionEvent::RecordingFinished(Artifact::video(
            bytes.to_vec(),
            Utc::now(),
        )))
        .unwrap();
    session
}

fn recording() -> Session {
    let mut session = camera_on(CaptureMode::Video);
    session.apply(SessionEvent::StartRecording).unwrap();
    session
}

fn assert_invariants(session: &Session) {
    if session.is_recording() {
        assert_eq!(session.mode(), CaptureMode::Video);
        assert!(session.camera_active());
    }
    if session.pending().is_some() {
        assert!(matches!(
            session.state(),
            SessionState::HasPhoto | SessionState::HasVideo | SessionState::Uploading
        ));
    }
}

// ============================================================================
// CAMERA LIFECYCLE
// ============================================================================

#[test]
fn test_start_camera_while_on_is_ignored() {
    let mut session = camera_on(CaptureMode::Photo);
    for _ in 0..5 {
        assert!(session.apply(SessionEvent::StartCamera).is_none());
    }
    assert_eq!(session.state(), SessionState::CameraOn);
}

#[test]
fn test_device_denied_keeps_camera_off() {
    let mut session = Session::new(CaptureMode::Photo);
    session.apply(SessionEvent::StartCamera).unwrap();
    let ticket = session.awaiting_device().unwrap();
    session
        .apply(SessionEvent::DeviceAcquireFailed {
            ticket,
            message: "Unable to access camera.".to_string(),
        })
        .unwrap();

    assert_eq!(session.state(), SessionState::CameraOff);
    assert!(session.status().is_error());
    assert!(!session.status().message.is_empty());
    assert!(session.awaiting_device().is_none());

    // explicit retry issues a fresh ticket
    session.apply(SessionEvent::StartCamera).unwrap();
    assert_ne!(session.awaiting_device(), Some(ticket));
}

#[test]
fn test_stop_camera_releases_from_every_active_state() {
    let cases = vec![
        (camera_on(CaptureMode::Photo), vec![Effect::ReleaseDevice]),
        (
            recording(),
            vec![Effect::DiscardRecording, Effect::ReleaseDevice],
        ),
        (with_photo(b"jpeg"), vec![Effect::ReleaseDevice]),
        (
            with_video(b"webm"),
            vec![Effect::RevokePreview, Effect::ReleaseDevice],
        ),
    ];

    for (mut session, expected) in cases {
        let effects = session.apply(SessionEvent::StopCamera).unwrap();
        assert_eq!(effects, expected);
        assert_eq!(session.state(), SessionState::CameraOff);
        assert!(session.pending().is_none());
        assert_invariants(&session);
    }
}

#[test]
fn test_stop_camera_when_off_is_noop() {
    let mut session = Session::new(CaptureMode::Photo);
    assert!(session.apply(SessionEvent::StopCamera).is_none());
}

// ============================================================================
// PHOTO
// ============================================================================

#[test]
fn test_second_capture_replaces_photo() {
    let mut session = with_photo(b"first");
    session.apply(SessionEvent::CapturePhoto).unwrap();
    session
        .apply(SessionEvent::PhotoCaptured(Artifact::photo(
            b"second".to_vec(),
            Utc::now(),
        )))
        .unwrap();

    assert_eq!(session.state(), SessionState::HasPhoto);
    assert_eq!(session.pending().unwrap().bytes().as_ref(), b"second");
}

#[test]
fn test_retake_photo_keeps_camera_on() {
    let mut session = with_photo(b"jpeg");
    let effects = session.apply(SessionEvent::Retake).unwrap();
    assert!(effects.is_empty());
    assert_eq!(session.state(), SessionState::CameraOn);
    assert!(session.pending().is_none());
    assert_eq!(session.status(), &Status::idle());
}

// ============================================================================
// VIDEO
// ============================================================================

#[test]
fn test_start_recording_requires_video_mode() {
    let mut session = camera_on(CaptureMode::Photo);
    assert!(session.apply(SessionEvent::StartRecording).is_none());

    let mut off = Session::new(CaptureMode::Video);
    assert!(off.apply(SessionEvent::StartRecording).is_none());
}

#[test]
fn test_stop_recording_when_not_recording_is_noop() {
    for mut session in [
        Session::new(CaptureMode::Video),
        camera_on(CaptureMode::Video),
        with_video(b"clip"),
    ] {
        let step = transition(&session, SessionEvent::StopRecording);
        assert!(!step.accepted);
        assert!(step.effects.is_empty());
        assert_eq!(step.session, session);
        assert!(session.apply(SessionEvent::StopRecording).is_none());
    }
}

#[test]
fn test_recording_finished_creates_preview() {
    let mut session = recording();
    assert_eq!(
        session.apply(SessionEvent::StopRecording).unwrap(),
        vec![Effect::FinalizeRecording]
    );
    let clip = Artifact::video(b"clip".to_vec(), Utc::now());
    let effects = session
        .apply(SessionEvent::RecordingFinished(clip.clone()))
        .unwrap();

    assert_eq!(effects, vec![Effect::CreatePreview(clip.clone())]);
    assert_eq!(session.state(), SessionState::HasVideo);
    assert_eq!(session.status(), &Status::info(VIDEO_RECORDED));
}

#[test]
fn test_retake_video_revokes_preview() {
    let mut session = with_video(b"clip");
    assert_eq!(
        session.apply(SessionEvent::Retake).unwrap(),
        vec![Effect::RevokePreview]
    );
    assert_eq!(session.state(), SessionState::CameraOn);
}

// ============================================================================
// MODE CHANGES
// ============================================================================

#[test]
fn test_mode_change_while_recording_is_rejected() {
    let session = recording();
    let step = transition(&session, SessionEvent::ChangeMode(CaptureMode::Photo));
    assert!(!step.accepted);
    assert_eq!(step.session.state(), SessionState::Recording);
    assert_eq!(step.session.mode(), CaptureMode::Video);
}

#[test]
fn test_mode_change_discards_artifact_and_stops_camera() {
    let mut session = with_photo(b"jpeg");
    let effects = session
        .apply(SessionEvent::ChangeMode(CaptureMode::Video))
        .unwrap();
    assert_eq!(effects, vec![Effect::ReleaseDevice]);
    assert_eq!(session.mode(), CaptureMode::Video);
    assert_eq!(session.state(), SessionState::CameraOff);
    assert!(session.pending().is_none());
}

#[test]
fn test_mode_change_with_camera_off_only_switches_mode() {
    let mut session = Session::new(CaptureMode::Photo);
    let effects = session
        .apply(SessionEvent::ChangeMode(CaptureMode::Video))
        .unwrap();
    assert!(effects.is_empty());
    assert_eq!(session.mode(), CaptureMode::Video);
}

// ============================================================================
// UPLOAD
// ============================================================================

#[test]
fn test_upload_is_exclusive() {
    let mut session = with_photo(b"jpeg");
    let effects = session.apply(SessionEvent::Upload).unwrap();
    assert!(matches!(effects.as_slice(), [Effect::Upload(_)]));
    assert_eq!(session.state(), SessionState::Uploading);
    assert_eq!(session.status(), &Status::info(UPLOADING));

    assert!(session.apply(SessionEvent::Upload).is_none());
    assert!(session.apply(SessionEvent::StopCamera).is_none());
    assert!(session
        .apply(SessionEvent::ChangeMode(CaptureMode::Video))
        .is_none());
}

#[test]
fn test_upload_failure_preserves_artifact() {
    let mut session = with_video(b"\x1a\x45\xdf\xa3 clip bytes");
    let before = session.pending().unwrap().clone();
    session.apply(SessionEvent::Upload).unwrap();
    session
        .apply(SessionEvent::UploadFailed {
            message: Some("Only video files are allowed".to_string()),
        })
        .unwrap();

    assert_eq!(session.state(), SessionState::HasVideo);
    assert_eq!(session.pending(), Some(&before));
    assert_eq!(
        session.status(),
        &Status::error("Only video files are allowed")
    );

    // retry without recapturing
    assert!(session.apply(SessionEvent::Upload).is_some());
}

#[test]
fn test_upload_success_notifies_once() {
    let mut session = with_photo(b"jpeg");
    let info = session.pending().unwrap().info();
    session.apply(SessionEvent::Upload).unwrap();
    let effects = session.apply(SessionEvent::UploadSucceeded).unwrap();

    assert_eq!(effects, vec![Effect::NotifyUploadSuccess(info)]);
    assert_eq!(session.state(), SessionState::CameraOn);
    assert!(session.pending().is_none());
    assert_eq!(session.status(), &Status::success(PHOTO_UPLOADED));

    // a duplicate completion is ignored
    assert!(session.apply(SessionEvent::UploadSucceeded).is_none());
}

#[test]
fn test_video_upload_success_revokes_preview() {
    let mut session = with_video(b"clip");
    session.apply(SessionEvent::Upload).unwrap();
    let effects = session.apply(SessionEvent::UploadSucceeded).unwrap();
    assert_eq!(effects[0], Effect::RevokePreview);
    assert!(matches!(effects[1], Effect::NotifyUploadSuccess(_)));
    assert_eq!(session.status(), &Status::success(VIDEO_UPLOADED));
}

#[test]
fn test_upload_without_artifact_is_rejected() {
    let mut session = camera_on(CaptureMode::Photo);
    assert!(session.apply(SessionEvent::Upload).is_none());
}

// ============================================================================
// TEARDOWN
// ============================================================================

#[test]
fn test_teardown_during_upload_releases_everything() {
    let mut session = with_video(b"clip");
    session.apply(SessionEvent::Upload).unwrap();
    let effects = session.apply(SessionEvent::Teardown).unwrap();
    assert_eq!(effects, vec![Effect::RevokePreview, Effect::ReleaseDevice]);
    assert_eq!(session.state(), SessionState::CameraOff);

    // the late upload completion no longer applies
    assert!(session.apply(SessionEvent::UploadSucceeded).is_none());
}

#[test]
fn test_invariants_hold_over_event_sequence() {
    let events = vec![
        SessionEvent::ChangeMode(CaptureMode::Video),
        SessionEvent::StartCamera,
        SessionEvent::StartRecording,
        SessionEvent::ChangeMode(CaptureMode::Photo),
        SessionEvent::StopRecording,
        SessionEvent::StopRecording,
        SessionEvent::Retake,
        SessionEvent::CapturePhoto,
        SessionEvent::StopCamera,
        SessionEvent::Upload,
        SessionEvent::Teardown,
    ];

    let mut session = Session::new(CaptureMode::Photo);
    for event in events {
        let effects = session.apply(event).unwrap_or_default();
        for effect in effects {
            if let Effect::AcquireDevice { ticket, .. } = effect {
                session
                    .apply(SessionEvent::DeviceAcquired { ticket })
                    .unwrap();
            }
        }
        assert_invariants(&session);
    }
    assert_eq!(session.state(), SessionState::CameraOff);
}
