//! Capture modes, media kinds and device constraints

use serde::{Deserialize, Serialize};

/// What the camera is currently set up to produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureMode {
    /// Still images
    #[default]
    Photo,
    /// Recorded clips with audio
    Video,
}

impl CaptureMode {
    /// Kind of artifact this mode produces
    pub fn media_kind(&self) -> MediaKind {
        match self {
            CaptureMode::Photo => MediaKind::Image,
            CaptureMode::Video => MediaKind::Video,
        }
    }
}

/// Kind of stored media, as the backend names it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MediaKind {
    /// Still image
    Image,
    /// Video clip
    Video,
}

impl MediaKind {
    /// Backend type tag
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "IMAGE",
            MediaKind::Video => "VIDEO",
        }
    }
}

/// Which camera to prefer on devices with several
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    /// Front camera
    #[default]
    User,
    /// Rear camera
    Environment,
}

/// Video track constraints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoConstraints {
    /// Ideal frame width
    pub ideal_width: u32,
    /// Ideal frame height
    pub ideal_height: u32,
    /// Preferred camera
    pub facing_mode: FacingMode,
}

impl Default for VideoConstraints {
    fn default() -> Self {
        Self {
            ideal_width: 1280,
            ideal_height: 720,
            facing_mode: FacingMode::User,
        }
    }
}

/// Constraints passed to the device media source on acquisition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaConstraints {
    /// Video is always requested
    pub video: VideoConstraints,
    /// Audio is requested only for recording
    pub audio: bool,
}

impl MediaConstraints {
    /// Derive constraints for a capture mode
    pub fn for_mode(mode: CaptureMode, video: VideoConstraints) -> Self {
        Self {
            video,
            audio: mode == CaptureMode::Video,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_only_in_video_mode() {
        let photo = MediaConstraints::for_mode(CaptureMode::Photo, VideoConstraints::default());
        let video = MediaConstraints::for_mode(CaptureMode::Video, VideoConstraints::default());
        assert!(!photo.audio);
        assert!(video.audio);
        assert_eq!(video.video.ideal_width, 1280);
        assert_eq!(video.video.ideal_height, 720);
    }

    #[test]
    fn test_media_kind_wire_format() {
        assert_eq!(serde_json::to_string(&MediaKind::Image).unwrap(), "\"IMAGE\"");
        assert_eq!(
            serde_json::from_str::<MediaKind>("\"VIDEO\"").unwrap(),
            MediaKind::Video
        );
        assert_eq!(CaptureMode::Video.media_kind(), MediaKind::Video);
    }
}
