//! Preview URL lifecycle

use bytes::Bytes;
use dashmap::DashMap;

/// Opaque URL pointing at an in-memory payload
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlobUrl(String);

impl BlobUrl {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BlobUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Creates and revokes preview URLs for recorded payloads.
///
/// Every URL handed out must eventually be revoked, or the payload stays
/// pinned in memory.
pub trait BlobUrlManager: Send + Sync {
    /// Publish `bytes` under a fresh URL
    fn create(&self, bytes: Bytes, mime_type: &str) -> BlobUrl;

    /// Release a URL. Returns false if it was not live.
    fn revoke(&self, url: &BlobUrl) -> bool;
}

#[derive(Debug)]
struct BlobEntry {
    bytes: Bytes,
    mime_type: String,
}

/// Process-local blob URL registry
#[derive(Debug)]
pub struct InMemoryBlobUrls {
    origin: String,
    entries: DashMap<String, BlobEntry>,
}

impl Default for InMemoryBlobUrls {
    fn default() -> Self {
        Self::new("snapvault")
    }
}

impl InMemoryBlobUrls {
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            entries: DashMap::new(),
        }
    }

    /// Number of URLs not yet revoked
    pub fn live_count(&self) -> usize {
        self.entries.len()
    }

    /// Whether `url` is still live
    pub fn is_live(&self, url: &BlobUrl) -> bool {
        self.entries.contains_key(url.as_str())
    }

    /// Payload and MIME type behind a live URL
    pub fn resolve(&self, url: &BlobUrl) -> Option<(Bytes, String)> {
        self.entries
            .get(url.as_str())
            .map(|entry| (entry.bytes.clone(), entry.mime_type.clone()))
    }
}

impl BlobUrlManager for InMemoryBlobUrls {
    fn create(&self, bytes: Bytes, mime_type: &str) -> BlobUrl {
        let url = format!("blob:{}/{}", self.origin, uuid::Uuid::new_v4());
        tracing::debug!(%url, bytes = bytes.len(), "blob url created");
        self.entries.insert(
            url.clone(),
            BlobEntry {
                bytes,
                mime_type: mime_type.to_string(),
            },
        );
        BlobUrl(url)
    }

    fn revoke(&self, url: &BlobUrl) -> bool {
        let removed = self.entries.remove(url.as_str()).is_some();
        if removed {
            tracing::debug!(url = %url, "blob url revoked");
        }
        removed
    }
}
