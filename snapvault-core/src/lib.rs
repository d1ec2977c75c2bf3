//! # SnapVault Core
//!
//! The capture workflow without any device, network or UI attached.
//! This crate holds the capture session state machine, the artifacts it
//! produces and the error taxonomy shared by the rest of the workspace.

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod artifact;
pub mod error;
pub mod mode;
pub mod session;

// Re-export main types
pub use artifact::{Artifact, ArtifactInfo};
pub use error::{DeviceAccessKind, ErrorCategory, SnapVaultError, SnapVaultResult};
pub use mode::{CaptureMode, FacingMode, MediaConstraints, MediaKind, VideoConstraints};
pub use session::{
    transition, AcquireTicket, Effect, Session, SessionEvent, SessionState, Status, StatusKind,
    Step,
};
