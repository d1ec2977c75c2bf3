//! Configuration types and defaults

use snapvault_api::DEFAULT_API_BASE_URL;
use snapvault_core::{CaptureMode, SnapVaultError, SnapVaultResult, VideoConstraints};
use snapvault_media::{DEFAULT_JPEG_QUALITY, PREFERRED_VIDEO_MIME};
use std::time::Duration;

/// Environment variable overriding [`GlobalConfig::api_base_url`]
pub const ENV_API_URL: &str = "SNAPVAULT_API_URL";
/// Environment variable overriding [`GlobalConfig::debug_logging`]
pub const ENV_DEBUG: &str = "SNAPVAULT_DEBUG";

/// Global SnapVault configuration
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalConfig {
    /// Media backend base URL, including the `/api` prefix
    pub api_base_url: String,
    /// Enable debug logging
    pub debug_logging: bool,
    /// Per-request timeout for backend calls
    pub request_timeout: Duration,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            debug_logging: false,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl GlobalConfig {
    /// Defaults overridden by `SNAPVAULT_API_URL` and `SNAPVAULT_DEBUG`
    pub fn from_env() -> SnapVaultResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> SnapVaultResult<Self> {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_API_URL) {
            let url = url.trim();
            if url.is_empty() {
                return Err(SnapVaultError::Configuration {
                    message: format!("{} is set but empty", ENV_API_URL),
                });
            }
            config.api_base_url = url.to_string();
        }

        if let Some(flag) = lookup(ENV_DEBUG) {
            config.debug_logging = match flag.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" | "" => false,
                other => {
                    return Err(SnapVaultError::Configuration {
                        message: format!("{} must be a boolean, got '{}'", ENV_DEBUG, other),
                    })
                }
            };
        }

        Ok(config)
    }
}

/// Capture-specific configuration
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureConfig {
    /// Mode the session starts in
    pub initial_mode: CaptureMode,
    /// Video constraints for device acquisition
    pub video: VideoConstraints,
    /// JPEG quality for photos, 1..=100
    pub jpeg_quality: u8,
    /// Codec tried first when recording; `None` uses the device default
    pub preferred_video_mime: Option<String>,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            initial_mode: CaptureMode::Photo,
            video: VideoConstraints::default(),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            preferred_video_mime: Some(PREFERRED_VIDEO_MIME.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = GlobalConfig::default();
        assert_eq!(config.api_base_url, "http://localhost:8080/api");
        assert!(!config.debug_logging);

        let capture = CaptureConfig::default();
        assert_eq!(capture.initial_mode, CaptureMode::Photo);
        assert_eq!(capture.jpeg_quality, 90);
        assert_eq!(capture.video.ideal_width, 1280);
        assert_eq!(capture.video.ideal_height, 720);
        assert_eq!(
            capture.preferred_video_mime.as_deref(),
            Some("video/webm;codecs=vp9")
        );
    }

    #[test]
    fn test_env_overrides() {
        let config = GlobalConfig::from_lookup(lookup(&[
            (ENV_API_URL, " http://media.local:9000/api "),
            (ENV_DEBUG, "TRUE"),
        ]))
        .unwrap();
        assert_eq!(config.api_base_url, "http://media.local:9000/api");
        assert!(config.debug_logging);

        let config = GlobalConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, GlobalConfig::default());
    }

    #[test]
    fn test_env_rejects_bad_values() {
        assert!(matches!(
            GlobalConfig::from_lookup(lookup(&[(ENV_DEBUG, "maybe")])),
            Err(SnapVaultError::Configuration { .. })
        ));
        assert!(matches!(
            GlobalConfig::from_lookup(lookup(&[(ENV_API_URL, "  ")])),
            Err(SnapVaultError::Configuration { .. })
        ));
    }
}
