//! HTTP client for the media backend

use crate::error::{ApiError, ApiResult};
use crate::protocol::{MediaFile, MediaFilter, UploadResponse};
use crate::service::{MediaCatalog, UploadOutcome, UploadService};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::{Response, StatusCode};
use snapvault_core::artifact::{PHOTO_CONTENT_TYPE, VIDEO_CONTENT_TYPE};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Backend address used when none is configured
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api";

/// Longest error body kept in [`ApiError::Status`]
const MAX_ERROR_BODY: usize = 512;

/// Client for `/media` endpoints
#[derive(Debug, Clone)]
pub struct MediaApiClient {
    base_url: Url,
    client: reqwest::Client,
}

impl MediaApiClient {
    /// Client with default HTTP settings
    pub fn new(base_url: &str) -> ApiResult<Self> {
        Self::with_client(base_url, reqwest::Client::new())
    }

    /// Client whose requests give up after `timeout`
    pub fn with_timeout(base_url: &str, timeout: Duration) -> ApiResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Self::with_client(base_url, client)
    }

    /// Client reusing an existing `reqwest::Client`
    pub fn with_client(base_url: &str, client: reqwest::Client) -> ApiResult<Self> {
        let trimmed = base_url.trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(ApiError::InvalidUrl {
                reason: "empty base URL".to_string(),
            });
        }
        // trailing slash so relative joins append instead of replacing the last segment
        let base_url = Url::parse(&format!("{}/", trimmed))?;
        Ok(Self { base_url, client })
    }

    /// Base URL, always ending in `/`
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> ApiResult<Url> {
        Ok(self.base_url.join(path)?)
    }

    /// Upload a JPEG image (`POST /media/upload/image`)
    pub async fn upload_image(&self, bytes: Bytes, filename: &str) -> ApiResult<UploadResponse> {
        self.send_upload("media/upload/image", bytes, filename, PHOTO_CONTENT_TYPE)
            .await
    }

    /// Upload a WebM video (`POST /media/upload/video`)
    pub async fn upload_video(&self, bytes: Bytes, filename: &str) -> ApiResult<UploadResponse> {
        self.send_upload("media/upload/video", bytes, filename, VIDEO_CONTENT_TYPE)
            .await
    }

    async fn send_upload(
        &self,
        path: &str,
        bytes: Bytes,
        filename: &str,
        content_type: &str,
    ) -> ApiResult<UploadResponse> {
        let url = self.endpoint(path)?;
        let size = bytes.len();
        let part = Part::bytes(bytes.to_vec())
            .file_name(filename.to_string())
            .mime_str(content_type)?;
        let form = Form::new().part("file", part);

        debug!(%url, filename, size, "uploading media");
        let response = self.client.post(url).multipart(form).send().await?;
        let result = Self::decode_outcome(response).await;
        match &result {
            Ok(r) if r.success => info!(filename, size, "upload accepted"),
            Ok(r) => warn!(filename, message = ?r.message, "upload refused"),
            Err(e) => warn!(filename, error = %e, "upload failed"),
        }
        result
    }

    /// List stored media (`GET /media`, `/media/images`, `/media/videos`)
    pub async fn list(&self, filter: MediaFilter) -> ApiResult<Vec<MediaFile>> {
        let url = self.endpoint(filter.path())?;
        let response = self.client.get(url).send().await?;
        let files: Vec<MediaFile> = Self::decode_json(response).await?;
        debug!(?filter, count = files.len(), "listed media");
        Ok(files)
    }

    /// All stored media
    pub async fn list_all(&self) -> ApiResult<Vec<MediaFile>> {
        self.list(MediaFilter::All).await
    }

    /// Stored images
    pub async fn list_images(&self) -> ApiResult<Vec<MediaFile>> {
        self.list(MediaFilter::Images).await
    }

    /// Stored videos
    pub async fn list_videos(&self) -> ApiResult<Vec<MediaFile>> {
        self.list(MediaFilter::Videos).await
    }

    /// One stored file (`GET /media/{id}`)
    pub async fn get(&self, id: i64) -> ApiResult<MediaFile> {
        let url = self.endpoint(&format!("media/{}", id))?;
        let response = self.client.get(url).send().await?;
        Self::decode_json(response).await
    }

    /// Delete one stored file (`DELETE /media/{id}`)
    pub async fn delete(&self, id: i64) -> ApiResult<UploadResponse> {
        let url = self.endpoint(&format!("media/{}", id))?;
        let response = self.client.delete(url).send().await?;
        let result = Self::decode_outcome(response).await;
        if let Ok(r) = &result {
            info!(id, success = r.success, "delete answered");
        }
        result
    }

    /// Download URL for a stored file
    pub fn download_url(&self, id: i64) -> ApiResult<Url> {
        self.endpoint(&format!("media/{}/download", id))
    }

    /// Fetch a stored file's payload (`GET /media/{id}/download`)
    pub async fn download(&self, id: i64) -> ApiResult<Bytes> {
        let response = self.client.get(self.download_url(id)?).send().await?;
        let response = Self::check_status(response).await?;
        Ok(response.bytes().await?)
    }

    async fn check_status(response: Response) -> ApiResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(Self::status_error(status, body))
    }

    fn status_error(status: StatusCode, mut body: String) -> ApiError {
        if body.len() > MAX_ERROR_BODY {
            let mut cut = MAX_ERROR_BODY;
            while !body.is_char_boundary(cut) {
                cut -= 1;
            }
            body.truncate(cut);
        }
        ApiError::Status {
            status: status.as_u16(),
            body,
        }
    }

    async fn decode_json<T: serde::de::DeserializeOwned>(response: Response) -> ApiResult<T> {
        let response = Self::check_status(response).await?;
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| ApiError::Decode {
            reason: e.to_string(),
        })
    }

    /// Upload and delete answer with an `UploadResponse` even on 4xx/5xx;
    /// keep the server's message when the body has that shape.
    async fn decode_outcome(response: Response) -> ApiResult<UploadResponse> {
        let status = response.status();
        let body = response.text().await?;
        match serde_json::from_str::<UploadResponse>(&body) {
            Ok(outcome) => Ok(outcome),
            Err(e) if status.is_success() => Err(ApiError::Decode {
                reason: e.to_string(),
            }),
            Err(_) => Err(Self::status_error(status, body)),
        }
    }
}

#[async_trait]
impl UploadService for MediaApiClient {
    async fn upload_photo(&self, bytes: Bytes, filename: &str) -> ApiResult<UploadOutcome> {
        Ok(self.upload_image(bytes, filename).await?.into())
    }

    async fn upload_video(&self, bytes: Bytes, filename: &str) -> ApiResult<UploadOutcome> {
        Ok(MediaApiClient::upload_video(self, bytes, filename).await?.into())
    }
}

#[async_trait]
impl MediaCatalog for MediaApiClient {
    async fn list(&self, filter: MediaFilter) -> ApiResult<Vec<MediaFile>> {
        MediaApiClient::list(self, filter).await
    }

    async fn delete(&self, id: i64) -> ApiResult<UploadOutcome> {
        Ok(MediaApiClient::delete(self, id).await?.into())
    }
}
