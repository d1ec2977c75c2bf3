//! Wire types of the media backend

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use snapvault_core::MediaKind;

/// A stored media file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaFile {
    /// Server assigned ID
    pub id: i64,
    /// Name on the server's disk
    pub file_name: String,
    /// Name the client uploaded
    pub original_file_name: String,
    /// `IMAGE` or `VIDEO`
    pub file_type: MediaKind,
    /// MIME type
    pub content_type: String,
    /// Size in bytes
    pub file_size: u64,
    /// Server local upload time
    pub uploaded_at: NaiveDateTime,
    /// Absolute download URL
    pub download_url: String,
}

/// Answer to upload and delete requests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    /// Whether the operation went through
    pub success: bool,
    /// Human readable outcome
    #[serde(default)]
    pub message: Option<String>,
    /// Stored file, on successful upload
    #[serde(default)]
    pub media_file: Option<MediaFile>,
}

/// Which stored media to list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MediaFilter {
    /// Everything
    #[default]
    All,
    /// Images only
    Images,
    /// Videos only
    Videos,
}

impl MediaFilter {
    /// Path below the API base URL
    pub fn path(&self) -> &'static str {
        match self {
            MediaFilter::All => "media",
            MediaFilter::Images => "media/images",
            MediaFilter::Videos => "media/videos",
        }
    }

    /// Whether a file of `kind` passes this filter
    pub fn matches(&self, kind: MediaKind) -> bool {
        match self {
            MediaFilter::All => true,
            MediaFilter::Images => kind == MediaKind::Image,
            MediaFilter::Videos => kind == MediaKind::Video,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_upload_response() {
        let json = r#"{
            "success": true,
            "message": "Image uploaded successfully",
            "mediaFile": {
                "id": 7,
                "fileName": "3f2a.jpg",
                "originalFileName": "photo_1700000000000.jpg",
                "fileType": "IMAGE",
                "contentType": "image/jpeg",
                "fileSize": 52311,
                "uploadedAt": "2024-03-01T10:15:30.123",
                "downloadUrl": "http://localhost:8080/api/media/7/download"
            }
        }"#;
        let response: UploadResponse = serde_json::from_str(json).unwrap();
        assert!(response.success);
        let file = response.media_file.unwrap();
        assert_eq!(file.id, 7);
        assert_eq!(file.file_type, MediaKind::Image);
        assert_eq!(file.original_file_name, "photo_1700000000000.jpg");
    }

    #[test]
    fn test_decode_error_response() {
        let json = r#"{"success":false,"message":"Only image files are allowed","mediaFile":null}"#;
        let response: UploadResponse = serde_json::from_str(json).unwrap();
        assert!(!response.success);
        assert_eq!(
            response.message.as_deref(),
            Some("Only image files are allowed")
        );
        assert!(response.media_file.is_none());
    }

    #[test]
    fn test_filter_paths() {
        assert_eq!(MediaFilter::All.path(), "media");
        assert_eq!(MediaFilter::Videos.path(), "media/videos");
        assert!(MediaFilter::Images.matches(MediaKind::Image));
        assert!(!MediaFilter::Images.matches(MediaKind::Video));
    }
}
