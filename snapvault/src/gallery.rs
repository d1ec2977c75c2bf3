//! Gallery of uploaded media

use crate::event::Event;
use chrono::NaiveDateTime;
use snapvault_api::{ApiResult, MediaCatalog, MediaFile, MediaFilter};
use std::sync::Arc;
use tracing::{debug, warn};

/// Shown when the listing cannot be fetched
pub const LOAD_FAILED_MESSAGE: &str =
    "Failed to load media files. Please ensure the backend server is running.";

/// Shown when a delete does not go through
pub const DELETE_FAILED_MESSAGE: &str = "Failed to delete file. Please try again.";

/// Filterable list of stored media
pub struct Gallery {
    catalog: Arc<dyn MediaCatalog>,
    filter: MediaFilter,
    files: Vec<MediaFile>,
    error: Option<String>,
}

impl std::fmt::Debug for Gallery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gallery")
            .field("filter", &self.filter)
            .field("files", &self.files.len())
            .field("error", &self.error)
            .finish()
    }
}

impl Gallery {
    /// Empty gallery showing everything; call [`Gallery::refresh`] to load it
    pub fn new(catalog: Arc<dyn MediaCatalog>) -> Self {
        Self {
            catalog,
            filter: MediaFilter::All,
            files: Vec::new(),
            error: None,
        }
    }

    /// Active filter
    pub fn filter(&self) -> MediaFilter {
        self.filter
    }

    /// Files from the last successful load
    pub fn files(&self) -> &[MediaFile] {
        &self.files
    }

    /// Message from the last failed load
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether there is nothing to show and nothing went wrong
    pub fn is_empty(&self) -> bool {
        self.error.is_none() && self.files.is_empty()
    }

    /// Switch filter and reload
    pub async fn set_filter(&mut self, filter: MediaFilter) {
        self.filter = filter;
        self.refresh().await;
    }

    /// Reload the listing for the active filter. On failure the error
    /// message is set and the previous files are kept.
    pub async fn refresh(&mut self) {
        self.error = None;
        match self.catalog.list(self.filter).await {
            Ok(files) => {
                debug!(filter = ?self.filter, count = files.len(), "gallery loaded");
                self.files = files;
            }
            Err(error) => {
                warn!(%error, "gallery load failed");
                self.error = Some(LOAD_FAILED_MESSAGE.to_string());
            }
        }
    }

    /// Delete a stored file and drop it from the list.
    /// Returns false when the backend refused.
    pub async fn delete(&mut self, id: i64) -> ApiResult<bool> {
        let outcome = self.catalog.delete(id).await.map_err(|error| {
            warn!(id, %error, "delete failed");
            error
        })?;
        if outcome.success {
            self.files.retain(|file| file.id != id);
        } else {
            warn!(id, message = ?outcome.message, "delete refused");
        }
        Ok(outcome.success)
    }

    /// React to a controller event; reloads after an upload
    pub async fn handle_event(&mut self, event: &Event) {
        if let Event::UploadSucceeded { info } = event {
            if self.filter.matches(info.kind) {
                self.refresh().await;
            }
        }
    }
}

/// Human readable byte count: `0 Bytes`, `512 Bytes`, `1.5 KB`, `2 MB`
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = format!("{:.2}", value);
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, UNITS[unit])
}

/// Upload time as `Mar 1, 2024, 10:15 AM`
pub fn format_uploaded_at(at: &NaiveDateTime) -> String {
    at.format("%b %-d, %Y, %I:%M %p").to_string()
}
