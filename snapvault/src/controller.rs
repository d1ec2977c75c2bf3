//! Capture controller
//!
//! [`CaptureController`] drives a [`Session`] against a real device source,
//! upload service and preview URL manager. Every action is fed to the
//! state machine in issue order under one lock; effects that finish
//! synchronously (frame grab, recorder start/stop, preview URLs, track
//! release) run under that lock, while device acquisition and upload run
//! on a spawned task with the lock released and are answered with a
//! completion event. That task finishes even if the caller stops waiting,
//! so the session never stays in `Uploading` or waiting for a grant.
//!
//! Failures never escape an action: they end up in the session status and
//! on the event stream.

use crate::config::CaptureConfig;
use crate::event::{Event, EventStream};
use chrono::Utc;
use parking_lot::Mutex;
use snapvault_api::UploadService;
use snapvault_core::{
    AcquireTicket, Artifact, ArtifactInfo, CaptureMode, Effect, MediaConstraints, Session,
    SessionEvent, SessionState, SnapVaultError, SnapVaultResult, Status,
};
use snapvault_media::{
    BlobUrl, BlobUrlManager, DeviceMediaSource, InMemoryBlobUrls, MediaRecorder, MediaResult,
    MediaStream, PhotoEncoder, RecorderOptions,
};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Callback invoked once per successful upload
pub type UploadCallback = Arc<dyn Fn(&ArtifactInfo) + Send + Sync>;

/// Everything a view needs to render the capture screen
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    /// Current state
    pub state: SessionState,
    /// Current capture mode
    pub mode: CaptureMode,
    /// Status line
    pub status: Status,
    /// Whether the recorder is running
    pub is_recording: bool,
    /// Whether a device stream is held
    pub camera_active: bool,
    /// Artifact waiting for upload
    pub pending: Option<ArtifactInfo>,
    /// Playback URL of a recorded clip
    pub preview_url: Option<BlobUrl>,
}

struct Inner {
    session: Session,
    stream: Option<MediaStream>,
    recorder: Option<MediaRecorder>,
    preview: Option<BlobUrl>,
}

impl Inner {
    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.session.state(),
            mode: self.session.mode(),
            status: self.session.status().clone(),
            is_recording: self.session.is_recording(),
            camera_active: self.session.camera_active(),
            pending: self.session.pending().map(Artifact::info),
            preview_url: self.preview.clone(),
        }
    }
}

/// Suspended work, run with the lock released
enum Work {
    Acquire {
        ticket: AcquireTicket,
        constraints: MediaConstraints,
    },
    Upload(Artifact),
}

#[derive(Default)]
struct Dispatch {
    accepted: bool,
    work: Vec<Work>,
    events: Vec<Event>,
}

struct Shared {
    inner: Mutex<Inner>,
    device: Arc<dyn DeviceMediaSource>,
    uploader: Arc<dyn UploadService>,
    blob_urls: Arc<dyn BlobUrlManager>,
    photo_encoder: PhotoEncoder,
    recorder_options: RecorderOptions,
    events: broadcast::Sender<Event>,
    snapshots: watch::Sender<SessionSnapshot>,
    on_upload_success: Option<UploadCallback>,
}

impl Shared {
    /// Feed `event` and everything it triggers, then publish the result.
    /// `after` runs under the same lock once the queue is drained.
    fn dispatch_with(
        &self,
        event: SessionEvent,
        after: impl FnOnce(&mut Inner, &mut Dispatch),
    ) -> Dispatch {
        let dispatch = {
            let mut inner = self.inner.lock();
            let mut dispatch = self.process(&mut *inner, event);
            after(&mut *inner, &mut dispatch);
            self.snapshots.send_replace(inner.snapshot());
            dispatch
        };
        self.emit(&dispatch.events);
        dispatch
    }

    fn dispatch(&self, event: SessionEvent) -> Dispatch {
        self.dispatch_with(event, |_, _| {})
    }

    fn process(&self, inner: &mut Inner, event: SessionEvent) -> Dispatch {
        let mut dispatch = Dispatch::default();
        let mut queue = VecDeque::from([event]);
        let mut first = true;

        while let Some(event) = queue.pop_front() {
            let effects = inner.session.apply(event);
            if first {
                dispatch.accepted = effects.is_some();
                first = false;
            }
            for effect in effects.into_iter().flatten() {
                self.execute(inner, effect, &mut queue, &mut dispatch);
            }
        }
        dispatch
    }

    fn execute(
        &self,
        inner: &mut Inner,
        effect: Effect,
        queue: &mut VecDeque<SessionEvent>,
        dispatch: &mut Dispatch,
    ) {
        match effect {
            Effect::AcquireDevice {
                ticket,
                constraints,
            } => dispatch.work.push(Work::Acquire {
                ticket,
                constraints,
            }),

            Effect::ReleaseDevice => {
                if let Some(stream) = inner.stream.take() {
                    let tracks = stream.live_track_count();
                    self.device.release(stream);
                    info!(tracks, "camera released");
                    dispatch.events.push(Event::CameraStopped);
                }
            }

            Effect::EncodePhoto => {
                let photo = match inner.stream.as_ref() {
                    Some(stream) => stream
                        .snapshot()
                        .and_then(|frame| self.photo_encoder.encode(&frame))
                        .map_err(SnapVaultError::from),
                    None => Err(no_stream()),
                };
                queue.push_back(match photo {
                    Ok(bytes) => {
                        debug!(size = bytes.len(), "photo encoded");
                        SessionEvent::PhotoCaptured(Artifact::photo(bytes, Utc::now()))
                    }
                    Err(error) => capture_failed(error, &mut dispatch.events),
                });
            }

            Effect::StartRecorder => {
                let recorder = match inner.stream.as_ref() {
                    Some(stream) => MediaRecorder::start(stream, &self.recorder_options)
                        .map_err(SnapVaultError::from),
                    None => Err(no_stream()),
                };
                match recorder {
                    Ok(recorder) => inner.recorder = Some(recorder),
                    Err(error) => queue.push_back(capture_failed(error, &mut dispatch.events)),
                }
            }

            Effect::FinalizeRecording => {
                let clip = match inner.recorder.take() {
                    Some(recorder) => recorder.stop().map_err(SnapVaultError::from),
                    None => Err(no_stream()),
                };
                queue.push_back(match clip {
                    Ok(clip) if clip.bytes.is_empty() => capture_failed(
                        SnapVaultError::Encoding {
                            codec: clip.mime_type,
                            reason: "recording produced no data".to_string(),
                        },
                        &mut dispatch.events,
                    ),
                    Ok(clip) => SessionEvent::RecordingFinished(Artifact::video(clip.bytes, Utc::now())),
                    Err(error) => capture_failed(error, &mut dispatch.events),
                });
            }

            Effect::DiscardRecording => {
                if let Some(recorder) = inner.recorder.take() {
                    recorder.discard();
                }
            }

            Effect::CreatePreview(artifact) => {
                if let Some(old) = inner.preview.take() {
                    self.blob_urls.revoke(&old);
                }
                let url = self
                    .blob_urls
                    .create(artifact.bytes().clone(), artifact.content_type());
                debug!(url = %url, "preview created");
                inner.preview = Some(url);
            }

            Effect::RevokePreview => {
                if let Some(url) = inner.preview.take() {
                    self.blob_urls.revoke(&url);
                    debug!(url = %url, "preview revoked");
                }
            }

            Effect::Upload(artifact) => dispatch.work.push(Work::Upload(artifact)),

            Effect::NotifyUploadSuccess(info) => {
                dispatch.events.push(Event::UploadSucceeded { info })
            }
        }
    }

    fn emit(&self, events: &[Event]) {
        for event in events {
            if let (Event::UploadSucceeded { info }, Some(callback)) =
                (event, self.on_upload_success.as_ref())
            {
                callback(info);
            }
            // no subscribers is fine
            let _ = self.events.send(event.clone());
        }
    }

    fn complete_acquire(&self, ticket: AcquireTicket, result: MediaResult<MediaStream>) -> Vec<Work> {
        match result {
            Ok(stream) => {
                let event = SessionEvent::DeviceAcquired { ticket };
                self.dispatch_with(event, |inner, dispatch| {
                    if dispatch.accepted {
                        info!(
                            stream = stream.id(),
                            tracks = stream.tracks().len(),
                            audio = stream.has_audio(),
                            "camera started"
                        );
                        inner.stream = Some(stream);
                        dispatch.events.insert(0, Event::CameraStarted);
                    } else {
                        debug!(ticket = ticket.0, "releasing late device grant");
                        self.device.release(stream);
                    }
                })
                .work
            }
            Err(error) => {
                let error = SnapVaultError::from(error);
                warn!(%error, "camera unavailable");
                let message = error.user_message();
                let event = SessionEvent::DeviceAcquireFailed {
                    ticket,
                    message: message.clone(),
                };
                self.dispatch_with(event, |_, dispatch| {
                    if dispatch.accepted {
                        dispatch.events.push(Event::CaptureError { message });
                    }
                })
                .work
            }
        }
    }

    /// Carry out suspended work and whatever its completion triggers
    async fn run(self: Arc<Self>, work: Vec<Work>) {
        let mut work: VecDeque<Work> = work.into();
        while let Some(item) = work.pop_front() {
            let next = match item {
                Work::Acquire {
                    ticket,
                    constraints,
                } => {
                    debug!(ticket = ticket.0, audio = constraints.audio, "requesting device");
                    let result = self.device.acquire(&constraints).await;
                    self.complete_acquire(ticket, result)
                }
                Work::Upload(artifact) => self.upload(artifact).await,
            };
            work.extend(next);
        }
    }

    async fn upload(&self, artifact: Artifact) -> Vec<Work> {
        info!(filename = artifact.filename(), size = artifact.len(), "uploading");
        let result = self
            .uploader
            .upload(artifact.kind(), artifact.bytes().clone(), artifact.filename())
            .await;

        let event = match result {
            Ok(outcome) if outcome.success => {
                info!(filename = artifact.filename(), "upload succeeded");
                SessionEvent::UploadSucceeded
            }
            Ok(outcome) => {
                warn!(message = ?outcome.message, "upload refused");
                SessionEvent::UploadFailed {
                    message: outcome.message,
                }
            }
            Err(error) => {
                warn!(%error, "upload failed");
                let error = SnapVaultError::Upload {
                    reason: error.to_string(),
                };
                SessionEvent::UploadFailed {
                    message: Some(error.user_message()),
                }
            }
        };
        self.complete_upload(event)
    }

    /// Buffer ready recorder chunks. An encoder error fails the capture
    /// while the recorder that raised it is still installed.
    fn pump_recorder(&self) -> usize {
        let dispatch = {
            let mut inner = self.inner.lock();
            let error = match inner.recorder.as_mut().map(MediaRecorder::pump) {
                None => return 0,
                Some(Ok(kept)) => return kept,
                Some(Err(error)) => error,
            };
            let mut events = Vec::new();
            let event = capture_failed(error.into(), &mut events);
            let mut dispatch = self.process(&mut *inner, event);
            events.append(&mut dispatch.events);
            dispatch.events = events;
            self.snapshots.send_replace(inner.snapshot());
            dispatch
        };
        self.emit(&dispatch.events);
        0
    }

    fn complete_upload(&self, event: SessionEvent) -> Vec<Work> {
        self.dispatch_with(event, |inner, dispatch| {
            let status = inner.session.status();
            if dispatch.accepted && status.is_error() {
                dispatch.events.push(Event::UploadFailed {
                    message: status.message.clone(),
                });
            }
        })
        .work
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        let mut inner = self.inner.lock();
        self.process(&mut *inner, SessionEvent::Teardown);
        self.snapshots.send_replace(inner.snapshot());
    }
}

fn no_stream() -> SnapVaultError {
    SnapVaultError::Encoding {
        codec: "capture".to_string(),
        reason: "no active stream".to_string(),
    }
}

fn capture_failed(error: SnapVaultError, events: &mut Vec<Event>) -> SessionEvent {
    warn!(%error, "capture failed");
    let message = error.user_message();
    events.push(Event::CaptureError {
        message: message.clone(),
    });
    SessionEvent::CaptureFailed { message }
}

/// Handle to one capture session.
///
/// Clones share the session. The camera is released and previews are
/// revoked when the last handle is dropped and no device request or
/// upload is still running.
///
/// Actions must be called from within a Tokio runtime.
#[derive(Clone)]
pub struct CaptureController {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for CaptureController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureController")
            .field("snapshot", &self.snapshot())
            .finish()
    }
}

impl CaptureController {
    /// Start configuring a controller
    pub fn builder() -> CaptureControllerBuilder {
        CaptureControllerBuilder::new()
    }

    /// Request the camera for the current mode. Waits for the device.
    pub async fn start_camera(&self) -> SessionSnapshot {
        self.drive(SessionEvent::StartCamera).await
    }

    /// Grab and encode the current frame (photo mode)
    pub async fn capture_photo(&self) -> SessionSnapshot {
        self.drive(SessionEvent::CapturePhoto).await
    }

    /// Start recording (video mode, camera on)
    pub async fn start_recording(&self) -> SessionSnapshot {
        self.drive(SessionEvent::StartRecording).await
    }

    /// Stop recording and keep the clip. No-op unless recording.
    pub async fn stop_recording(&self) -> SessionSnapshot {
        self.drive(SessionEvent::StopRecording).await
    }

    /// Drop the pending artifact and go back to the live preview
    pub async fn retake(&self) -> SessionSnapshot {
        self.drive(SessionEvent::Retake).await
    }

    /// Release the camera and discard everything pending
    pub async fn stop_camera(&self) -> SessionSnapshot {
        self.drive(SessionEvent::StopCamera).await
    }

    /// Switch capture mode. Ignored while recording or uploading.
    pub async fn set_mode(&self, mode: CaptureMode) -> SessionSnapshot {
        self.drive(SessionEvent::ChangeMode(mode)).await
    }

    /// Upload the pending artifact and wait for the outcome.
    /// Ignored while another upload is in flight.
    pub async fn upload(&self) -> SessionSnapshot {
        self.drive(SessionEvent::Upload).await
    }

    /// Release everything, as dropping the last handle would
    pub async fn shutdown(&self) -> SessionSnapshot {
        self.drive(SessionEvent::Teardown).await
    }

    /// Move chunks the encoder has ready into the recording buffer.
    /// Returns how many were kept; zero when not recording.
    pub fn pump_recording(&self) -> usize {
        self.shared.pump_recorder()
    }

    /// Current view of the session
    pub fn snapshot(&self) -> SessionSnapshot {
        self.shared.snapshots.borrow().clone()
    }

    /// Copy of the underlying state machine
    pub fn session(&self) -> Session {
        self.shared.inner.lock().session.clone()
    }

    /// Receiver that sees a new snapshot after every processed action
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.shared.snapshots.subscribe()
    }

    /// Stream of camera, capture and upload events
    pub fn events(&self) -> EventStream {
        EventStream::new(self.shared.events.subscribe())
    }

    async fn drive(&self, event: SessionEvent) -> SessionSnapshot {
        let name = event.name();
        let dispatch = self.shared.dispatch(event);
        if !dispatch.accepted {
            debug!(action = name, "action ignored in current state");
        }

        if !dispatch.work.is_empty() {
            let task = tokio::spawn(Arc::clone(&self.shared).run(dispatch.work));
            if let Err(error) = task.await {
                warn!(%error, action = name, "capture task aborted");
            }
        }

        self.snapshot()
    }
}

/// Fluent builder for capture controllers
pub struct CaptureControllerBuilder {
    config: CaptureConfig,
    device: Option<Arc<dyn DeviceMediaSource>>,
    uploader: Option<Arc<dyn UploadService>>,
    blob_urls: Option<Arc<dyn BlobUrlManager>>,
    on_upload_success: Option<UploadCallback>,
}

impl std::fmt::Debug for CaptureControllerBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureControllerBuilder")
            .field("config", &self.config)
            .field("device", &self.device.is_some())
            .field("uploader", &self.uploader.is_some())
            .field("blob_urls", &self.blob_urls.is_some())
            .field("on_upload_success", &self.on_upload_success.is_some())
            .finish()
    }
}

impl Default for CaptureControllerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureControllerBuilder {
    /// Builder with default capture settings and no collaborators
    pub fn new() -> Self {
        Self {
            config: CaptureConfig::default(),
            device: None,
            uploader: None,
            blob_urls: None,
            on_upload_success: None,
        }
    }

    /// Replace all capture settings
    pub fn config(mut self, config: CaptureConfig) -> Self {
        self.config = config;
        self
    }

    /// Mode the session starts in
    pub fn mode(mut self, mode: CaptureMode) -> Self {
        self.config.initial_mode = mode;
        self
    }

    /// JPEG quality for photos
    pub fn jpeg_quality(mut self, quality: u8) -> Self {
        self.config.jpeg_quality = quality;
        self
    }

    /// Codec tried first when recording; `None` uses the device default
    pub fn preferred_video_mime(mut self, mime: Option<&str>) -> Self {
        self.config.preferred_video_mime = mime.map(str::to_string);
        self
    }

    /// Camera and microphone provider (required)
    pub fn device(mut self, device: Arc<dyn DeviceMediaSource>) -> Self {
        self.device = Some(device);
        self
    }

    /// Upload backend (required)
    pub fn uploader(mut self, uploader: Arc<dyn UploadService>) -> Self {
        self.uploader = Some(uploader);
        self
    }

    /// Preview URL manager; defaults to an in-memory one
    pub fn blob_urls(mut self, blob_urls: Arc<dyn BlobUrlManager>) -> Self {
        self.blob_urls = Some(blob_urls);
        self
    }

    /// Called once for every upload the service accepts
    pub fn on_upload_success<F>(mut self, callback: F) -> Self
    where
        F: Fn(&ArtifactInfo) + Send + Sync + 'static,
    {
        self.on_upload_success = Some(Arc::new(callback));
        self
    }

    /// Build the controller with the camera off
    pub fn build(self) -> SnapVaultResult<CaptureController> {
        let device = self.device.ok_or_else(|| SnapVaultError::Configuration {
            message: "device media source is required".to_string(),
        })?;
        let uploader = self.uploader.ok_or_else(|| SnapVaultError::Configuration {
            message: "upload service is required".to_string(),
        })?;
        if !(1..=100).contains(&self.config.jpeg_quality) {
            return Err(SnapVaultError::Configuration {
                message: format!(
                    "jpeg quality must be within 1..=100, got {}",
                    self.config.jpeg_quality
                ),
            });
        }

        let blob_urls = self
            .blob_urls
            .unwrap_or_else(|| Arc::new(InMemoryBlobUrls::default()));
        let session =
            Session::new(self.config.initial_mode).with_video_constraints(self.config.video);
        let inner = Inner {
            session,
            stream: None,
            recorder: None,
            preview: None,
        };
        let (snapshots, _) = watch::channel(inner.snapshot());
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        debug!(mode = ?self.config.initial_mode, "capture controller ready");
        Ok(CaptureController {
            shared: Arc::new(Shared {
                inner: Mutex::new(inner),
                device,
                uploader,
                blob_urls,
                photo_encoder: PhotoEncoder::new(self.config.jpeg_quality),
                recorder_options: RecorderOptions {
                    preferred_mime: self.config.preferred_video_mime,
                },
                events,
                snapshots,
                on_upload_success: self.on_upload_success,
            }),
        })
    }
}
