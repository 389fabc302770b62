//! Core types for the partitioned cache store.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use thiserror::Error;

/// A single cached response.
///
/// Keys live outside the entry: an entry is addressed by the canonical
/// request URL (GET) or by the URL with a `body_hash` query parameter
/// appended (POST, see the strategy module).
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    /// Response body. `Bytes` so the cached copy and the returned copy
    /// share one buffer.
    pub payload: Bytes,
    /// MIME type of the payload
    pub content_type: String,
    /// When this entry was stored or last overwritten
    pub stored_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Create an entry stamped with the current time.
    pub fn new(payload: impl Into<Bytes>, content_type: impl Into<String>) -> Self {
        Self {
            payload: payload.into(),
            content_type: content_type.into(),
            stored_at: Utc::now(),
        }
    }

    /// Size of the payload in bytes.
    pub fn size_bytes(&self) -> usize {
        self.payload.len()
    }
}

/// Cache-related errors.
///
/// Request-serving code treats every one of these as a cache miss; they are
/// surfaced only to maintenance operations (clear, purge) and logs.
#[derive(Debug, Error)]
pub enum CacheError {
    /// I/O error during cache operations
    #[error("Cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Partition name contains path separators or is empty
    #[error("Invalid partition name: {0:?}")]
    InvalidPartition(String),

    /// Metadata sidecar could not be serialized or parsed
    #[error("Cache metadata error: {0}")]
    Metadata(#[from] serde_json::Error),
}

/// Versioned partition naming for the cache store.
///
/// Produces the two partitions the interception layer uses: a long-lived
/// static partition whose name carries the service version, and a runtime
/// partition for tiles, routes and geocoding results. On activation every
/// partition that starts with the service prefix but is neither of the two
/// current names gets purged, so version upgrades never leave orphaned
/// partitions behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheNamespace {
    service: String,
    version: String,
}

impl CacheNamespace {
    /// Create a namespace from a service name and version tag.
    pub fn new(service: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            version: version.into(),
        }
    }

    /// Prefix shared by every partition of this service.
    pub fn prefix(&self) -> String {
        format!("{}-", self.service)
    }

    /// Name of the versioned static partition.
    pub fn static_partition(&self) -> String {
        format!("{}-{}", self.service, self.version)
    }

    /// Name of the runtime partition.
    pub fn runtime_partition(&self) -> String {
        format!("{}-runtime", self.service)
    }

    /// The partition names that survive a purge.
    pub fn current_partitions(&self) -> Vec<String> {
        vec![self.static_partition(), self.runtime_partition()]
    }
}

/// Disk cache store configuration.
#[derive(Debug, Clone)]
pub struct DiskStoreConfig {
    /// Cache directory root
    pub root: PathBuf,
    /// Maximum total size across all partitions in bytes (default: 512 MB)
    pub max_size_bytes: usize,
}

impl Default for DiskStoreConfig {
    fn default() -> Self {
        let root = dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("reviermaps");

        Self {
            root,
            max_size_bytes: 512 * 1024 * 1024,
        }
    }
}
