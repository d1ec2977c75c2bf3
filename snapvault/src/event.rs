//! Event system for capture notifications

use futures::stream::{self, Stream};
use snapvault_core::ArtifactInfo;
use tokio::sync::broadcast;
use tracing::debug;

/// Notifications emitted by a capture controller
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A device stream was granted and the preview is live
    CameraStarted,
    /// The device stream was released
    CameraStopped,
    /// The upload service stored the pending artifact
    UploadSucceeded {
        /// What was uploaded
        info: ArtifactInfo,
    },
    /// The upload service refused the artifact or could not be reached
    UploadFailed {
        /// Message shown to the user
        message: String,
    },
    /// Device acquisition or capture failed
    CaptureError {
        /// Message shown to the user
        message: String,
    },
}

impl Event {
    /// Get the event type as a string
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::CameraStarted => "camera_started",
            Event::CameraStopped => "camera_stopped",
            Event::UploadSucceeded { .. } => "upload_succeeded",
            Event::UploadFailed { .. } => "upload_failed",
            Event::CaptureError { .. } => "capture_error",
        }
    }

    /// Check if this is an error event
    pub fn is_error_event(&self) -> bool {
        matches!(
            self,
            Event::UploadFailed { .. } | Event::CaptureError { .. }
        )
    }
}

/// Stream of controller events
#[derive(Debug)]
pub struct EventStream {
    receiver: broadcast::Receiver<Event>,
}

impl EventStream {
    /// Wrap a broadcast receiver
    pub fn new(receiver: broadcast::Receiver<Event>) -> Self {
        Self { receiver }
    }

    /// Next event; `None` once every controller handle is gone.
    /// Events missed by a slow reader are skipped.
    pub async fn next(&mut self) -> Option<Event> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(skipped, "event stream lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Next event if one is already queued
    pub fn try_next(&mut self) -> Option<Event> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    debug!(skipped, "event stream lagged");
                }
                Err(_) => return None,
            }
        }
    }

    /// Adapt into a `futures` stream
    pub fn into_stream(self) -> impl Stream<Item = Event> {
        stream::unfold(self, |mut events| async move {
            events.next().await.map(|event| (event, events))
        })
    }
}
