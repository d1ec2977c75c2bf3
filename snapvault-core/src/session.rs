//! Capture session state machine
//!
//! The session is a plain value. Every user action and every completion of
//! suspended work (device grant, encode, upload) is fed in as a
//! [`SessionEvent`]; the session either rejects it and stays untouched, or
//! moves to its next state and hands back the [`Effect`]s the caller must
//! carry out. Nothing here touches a device, a network or a clock, so the
//! whole workflow can be driven from tests without any of those present.

use crate::artifact::{Artifact, ArtifactInfo};
use crate::mode::{CaptureMode, MediaConstraints, MediaKind, VideoConstraints};
use tracing::{debug, trace};

/// Status shown after a photo is captured
pub const PHOTO_CAPTURED: &str = "Photo captured! Click Upload to save.";
/// Status shown after a clip is recorded
pub const VIDEO_RECORDED: &str = "Video recorded! Click Upload to save.";
/// Status shown while an upload is in flight
pub const UPLOADING: &str = "Uploading...";
/// Status shown after a photo upload succeeds
pub const PHOTO_UPLOADED: &str = "Photo uploaded successfully!";
/// Status shown after a clip upload succeeds
pub const VIDEO_UPLOADED: &str = "Video uploaded successfully!";
/// Status shown when the service rejects an upload without a message
pub const UPLOAD_FAILED: &str = "Upload failed";

/// Where the session is in the capture workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// No device stream held
    CameraOff,
    /// Device stream held, live preview, nothing captured
    CameraOn,
    /// Recorder running on the held stream
    Recording,
    /// A photo is pending upload
    HasPhoto,
    /// A clip is pending upload
    HasVideo,
    /// The pending artifact is being uploaded
    Uploading,
}

impl SessionState {
    /// Whether a device stream is held in this state
    pub fn camera_active(&self) -> bool {
        !matches!(self, SessionState::CameraOff)
    }

    /// Short lowercase name for logs
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::CameraOff => "camera_off",
            SessionState::CameraOn => "camera_on",
            SessionState::Recording => "recording",
            SessionState::HasPhoto => "has_photo",
            SessionState::HasVideo => "has_video",
            SessionState::Uploading => "uploading",
        }
    }
}

/// Severity of the status line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StatusKind {
    /// Nothing to show
    #[default]
    Idle,
    /// Progress or hint
    Info,
    /// Upload finished
    Success,
    /// Something failed; user action needed
    Error,
}

/// Status line shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Status {
    /// Severity
    pub kind: StatusKind,
    /// Message, empty when idle
    pub message: String,
}

impl Status {
    /// Empty status
    pub fn idle() -> Self {
        Self::default()
    }

    /// Informational status
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Info,
            message: message.into(),
        }
    }

    /// Success status
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Success,
            message: message.into(),
        }
    }

    /// Error status
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Error,
            message: message.into(),
        }
    }

    /// Whether this is an error status
    pub fn is_error(&self) -> bool {
        self.kind == StatusKind::Error
    }
}

/// Identifies one device acquisition request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AcquireTicket(pub u64);

/// Inputs to the state machine
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// User asked to turn the camera on
    StartCamera,
    /// The device source granted a stream for `ticket`
    DeviceAcquired {
        /// Request this grant answers
        ticket: AcquireTicket,
    },
    /// The device source refused `ticket`
    DeviceAcquireFailed {
        /// Request this failure answers
        ticket: AcquireTicket,
        /// User facing message
        message: String,
    },
    /// User asked for a photo
    CapturePhoto,
    /// A frame was encoded into a photo
    PhotoCaptured(Artifact),
    /// User asked to start recording
    StartRecording,
    /// User asked to stop recording
    StopRecording,
    /// The recorder produced a clip
    RecordingFinished(Artifact),
    /// Photo encode or recorder failure, after any codec fallback
    CaptureFailed {
        /// User facing message
        message: String,
    },
    /// User discarded the pending artifact
    Retake,
    /// User turned the camera off
    StopCamera,
    /// User picked a capture mode
    ChangeMode(CaptureMode),
    /// User asked to upload the pending artifact
    Upload,
    /// The upload service accepted the artifact
    UploadSucceeded,
    /// The upload service rejected the artifact or could not be reached
    UploadFailed {
        /// Message from the service, if it gave one
        message: Option<String>,
    },
    /// The owner is going away; release everything
    Teardown,
}

impl SessionEvent {
    /// Short lowercase name for logs
    pub fn name(&self) -> &'static str {
        match self {
            SessionEvent::StartCamera => "start_camera",
            SessionEvent::DeviceAcquired { .. } => "device_acquired",
            SessionEvent::DeviceAcquireFailed { .. } => "device_acquire_failed",
            SessionEvent::CapturePhoto => "capture_photo",
            SessionEvent::PhotoCaptured(_) => "photo_captured",
            SessionEvent::StartRecording => "start_recording",
            SessionEvent::StopRecording => "stop_recording",
            SessionEvent::RecordingFinished(_) => "recording_finished",
            SessionEvent::CaptureFailed { .. } => "capture_failed",
            SessionEvent::Retake => "retake",
            SessionEvent::StopCamera => "stop_camera",
            SessionEvent::ChangeMode(_) => "change_mode",
            SessionEvent::Upload => "upload",
            SessionEvent::UploadSucceeded => "upload_succeeded",
            SessionEvent::UploadFailed { .. } => "upload_failed",
            SessionEvent::Teardown => "teardown",
        }
    }
}

/// Work the caller must carry out after a transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Request a device stream; answer with `DeviceAcquired` or `DeviceAcquireFailed`
    AcquireDevice {
        /// Ticket to echo back
        ticket: AcquireTicket,
        /// Constraints for the request
        constraints: MediaConstraints,
    },
    /// Stop every track of the held stream and drop it
    ReleaseDevice,
    /// Grab the current frame and encode it; answer with `PhotoCaptured` or `CaptureFailed`
    EncodePhoto,
    /// Start the recorder on the held stream; answer failures with `CaptureFailed`
    StartRecorder,
    /// Stop the recorder; answer with `RecordingFinished` or `CaptureFailed`
    FinalizeRecording,
    /// Stop the recorder and throw its output away
    DiscardRecording,
    /// Publish a preview URL for a recorded clip
    CreatePreview(Artifact),
    /// Revoke the current preview URL
    RevokePreview,
    /// Send the artifact; answer with `UploadSucceeded` or `UploadFailed`
    Upload(Artifact),
    /// Tell the host an upload went through
    NotifyUploadSuccess(ArtifactInfo),
}

/// Result of [`transition`]
#[derive(Debug, Clone)]
pub struct Step {
    /// Session after the event
    pub session: Session,
    /// Work to carry out, empty when rejected
    pub effects: Vec<Effect>,
    /// False when the guard rejected the event and the session is unchanged
    pub accepted: bool,
}

/// One capture workflow
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    mode: CaptureMode,
    state: SessionState,
    pending: Option<Artifact>,
    status: Status,
    video: VideoConstraints,
    acquiring: Option<AcquireTicket>,
    next_ticket: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(CaptureMode::default())
    }
}

/// Pure transition function: the session after `event` and the effects to run.
pub fn transition(session: &Session, event: SessionEvent) -> Step {
    let mut next = session.clone();
    match next.apply(event) {
        Some(effects) => Step {
            session: next,
            effects,
            accepted: true,
        },
        None => Step {
            session: session.clone(),
            effects: Vec::new(),
            accepted: false,
        },
    }
}

impl Session {
    /// New session with the camera off
    pub fn new(mode: CaptureMode) -> Self {
        Self {
            mode,
            state: SessionState::CameraOff,
            pending: None,
            status: Status::idle(),
            video: VideoConstraints::default(),
            acquiring: None,
            next_ticket: 1,
        }
    }

    /// Use custom video constraints for later acquisitions
    pub fn with_video_constraints(mut self, video: VideoConstraints) -> Self {
        self.video = video;
        self
    }

    /// Current capture mode
    pub fn mode(&self) -> CaptureMode {
        self.mode
    }

    /// Current state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Current status line
    pub fn status(&self) -> &Status {
        &self.status
    }

    /// Artifact waiting for upload
    pub fn pending(&self) -> Option<&Artifact> {
        self.pending.as_ref()
    }

    /// Whether the recorder is running
    pub fn is_recording(&self) -> bool {
        self.state == SessionState::Recording
    }

    /// Whether a device stream is held
    pub fn camera_active(&self) -> bool {
        self.state.camera_active()
    }

    /// Ticket of the acquisition in flight, if any
    pub fn awaiting_device(&self) -> Option<AcquireTicket> {
        self.acquiring
    }

    /// Feed one event. Returns the effects to run, or `None` when the event
    /// is not valid in the current state; a rejected event leaves the
    /// session untouched.
    pub fn apply(&mut self, event: SessionEvent) -> Option<Vec<Effect>> {
        let from = self.state;
        let name = event.name();
        let effects = self.reduce(event);
        match &effects {
            Some(effects) => debug!(
                event = name,
                from = from.name(),
                to = self.state.name(),
                effects = effects.len(),
                "session transition"
            ),
            None => trace!(event = name, state = from.name(), "session event ignored"),
        }
        effects
    }

    fn reduce(&mut self, event: SessionEvent) -> Option<Vec<Effect>> {
        use SessionState::*;

        match event {
            SessionEvent::StartCamera => {
                if self.state != CameraOff || self.acquiring.is_some() {
                    return None;
                }
                let ticket = AcquireTicket(self.next_ticket);
                self.next_ticket += 1;
                self.acquiring = Some(ticket);
                Some(vec![Effect::AcquireDevice {
                    ticket,
                    constraints: MediaConstraints::for_mode(self.mode, self.video),
                }])
            }

            SessionEvent::DeviceAcquired { ticket } => {
                if self.state != CameraOff || self.acquiring != Some(ticket) {
                    return None;
                }
                self.acquiring = None;
                self.state = CameraOn;
                self.status = Status::idle();
                Some(Vec::new())
            }

            SessionEvent::DeviceAcquireFailed { ticket, message } => {
                if self.acquiring != Some(ticket) {
                    return None;
                }
                self.acquiring = None;
                self.status = Status::error(message);
                Some(Vec::new())
            }

            SessionEvent::CapturePhoto => {
                if self.mode != CaptureMode::Photo || !matches!(self.state, CameraOn | HasPhoto) {
                    return None;
                }
                Some(vec![Effect::EncodePhoto])
            }

            SessionEvent::PhotoCaptured(artifact) => {
                if self.mode != CaptureMode::Photo
                    || !matches!(self.state, CameraOn | HasPhoto)
                    || artifact.kind() != MediaKind::Image
                {
                    return None;
                }
                self.pending = Some(artifact);
                self.state = HasPhoto;
                self.status = Status::info(PHOTO_CAPTURED);
                Some(Vec::new())
            }

            SessionEvent::StartRecording => {
                if self.mode != CaptureMode::Video || self.state != CameraOn {
                    return None;
                }
                self.state = Recording;
                self.status = Status::idle();
                Some(vec![Effect::StartRecorder])
            }

            SessionEvent::StopRecording => {
                if self.state != Recording {
                    return None;
                }
                Some(vec![Effect::FinalizeRecording])
            }

            SessionEvent::RecordingFinished(artifact) => {
                if self.state != Recording || artifact.kind() != MediaKind::Video {
                    return None;
                }
                self.pending = Some(artifact.clone());
                self.state = HasVideo;
                self.status = Status::info(VIDEO_RECORDED);
                Some(vec![Effect::CreatePreview(artifact)])
            }

            SessionEvent::CaptureFailed { message } => {
                let effects = match self.state {
                    Recording => {
                        self.state = CameraOn;
                        vec![Effect::DiscardRecording]
                    }
                    CameraOn | HasPhoto => Vec::new(),
                    _ => return None,
                };
                self.status = Status::error(message);
                Some(effects)
            }

            SessionEvent::Retake => {
                let effects = match self.state {
                    HasPhoto => Vec::new(),
                    HasVideo => vec![Effect::RevokePreview],
                    _ => return None,
                };
                self.pending = None;
                self.state = CameraOn;
                self.status = Status::idle();
                Some(effects)
            }

            SessionEvent::StopCamera => {
                let idle = self.state == CameraOff && self.acquiring.is_none();
                if idle || self.state == Uploading {
                    return None;
                }
                Some(self.shut_down())
            }

            SessionEvent::ChangeMode(mode) => {
                if mode == self.mode || matches!(self.state, Recording | Uploading) {
                    return None;
                }
                let effects = self.shut_down();
                self.mode = mode;
                Some(effects)
            }

            SessionEvent::Upload => {
                if !matches!(self.state, HasPhoto | HasVideo) {
                    return None;
                }
                let artifact = self.pending.clone()?;
                self.state = Uploading;
                self.status = Status::info(UPLOADING);
                Some(vec![Effect::Upload(artifact)])
            }

            SessionEvent::UploadSucceeded => {
                if self.state != Uploading {
                    return None;
                }
                let mut effects = Vec::new();
                let message = match self.pending.take() {
                    Some(artifact) if artifact.kind() == MediaKind::Video => {
                        effects.push(Effect::RevokePreview);
                        effects.push(Effect::NotifyUploadSuccess(artifact.info()));
                        VIDEO_UPLOADED
                    }
                    Some(artifact) => {
                        effects.push(Effect::NotifyUploadSuccess(artifact.info()));
                        PHOTO_UPLOADED
                    }
                    None => PHOTO_UPLOADED,
                };
                self.state = CameraOn;
                self.status = Status::success(message);
                Some(effects)
            }

            SessionEvent::UploadFailed { message } => {
                if self.state != Uploading {
                    return None;
                }
                self.state = match self.pending.as_ref().map(Artifact::kind) {
                    Some(MediaKind::Image) => HasPhoto,
                    Some(MediaKind::Video) => HasVideo,
                    None => CameraOn,
                };
                let message = message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| UPLOAD_FAILED.to_string());
                self.status = Status::error(message);
                Some(Vec::new())
            }

            SessionEvent::Teardown => Some(self.shut_down()),
        }
    }

    /// Release everything and return to `CameraOff`
    fn shut_down(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.state == SessionState::Recording {
            effects.push(Effect::DiscardRecording);
        }
        if matches!(self.pending.as_ref().map(Artifact::kind), Some(MediaKind::Video)) {
            effects.push(Effect::RevokePreview);
        }
        if self.state.camera_active() {
            effects.push(Effect::ReleaseDevice);
        }
        self.pending = None;
        self.acquiring = None;
        self.state = SessionState::CameraOff;
        self.status = Status::idle();
        effects
    }
}
