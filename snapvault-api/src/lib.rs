//! # SnapVault API
//!
//! Client for the media backend's REST API: multipart uploads, listing
//! and filtering stored media, deletion and download.

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod error;
pub mod protocol;
pub mod service;

// Re-export main types
pub use client::{MediaApiClient, DEFAULT_API_BASE_URL};
pub use error::{ApiError, ApiResult};
pub use protocol::{MediaFile, MediaFilter, UploadResponse};
pub use service::{MediaCatalog, UploadOutcome, UploadService};
