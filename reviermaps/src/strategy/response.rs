//! Response model and fallback payloads.
//!
//! Every intercepted request resolves to a [`MapResponse`], including the
//! degraded shapes served when both network and cache fail: an empty
//! placeholder tile, a minimal valid style document, or a structured 503
//! error body tagged `offline: true`.

use crate::backend::HttpResponse;
use crate::cache::CacheEntry;
use crate::router::ResourceClass;
use bytes::Bytes;
use serde_json::json;

/// Where a response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServedFrom {
    /// Fresh from the backend
    Network,
    /// Previously cached entry
    Cache,
    /// Synthesized fallback (placeholder tile, offline style, degraded error)
    Fallback,
}

/// Resolved response for an intercepted request.
#[derive(Debug, Clone, PartialEq)]
pub struct MapResponse {
    pub status: u16,
    pub content_type: String,
    pub body: Bytes,
    pub served_from: ServedFrom,
    /// True only on synthesized fallbacks, matching the `offline: true`
    /// marker in degraded JSON bodies
    pub offline: bool,
}

impl MapResponse {
    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Wrap a backend response.
    pub fn from_network(response: HttpResponse) -> Self {
        Self {
            status: response.status,
            content_type: response.content_type,
            body: response.body,
            served_from: ServedFrom::Network,
            offline: false,
        }
    }

    /// Wrap a cached entry. Cached entries were real backend responses, so
    /// they come back as 200s.
    pub fn from_cache(entry: CacheEntry) -> Self {
        Self {
            status: 200,
            content_type: entry.content_type,
            body: entry.payload,
            served_from: ServedFrom::Cache,
            offline: false,
        }
    }

    /// Empty transparent tile, HTTP 200, so map rendering never errors on a
    /// missing tile.
    pub fn placeholder_tile() -> Self {
        Self {
            status: 200,
            content_type: "application/x-protobuf".to_string(),
            body: Bytes::new(),
            served_from: ServedFrom::Fallback,
            offline: true,
        }
    }

    /// Minimal valid style document pointing at the offline tile path.
    ///
    /// Always parses as a style document even with no network: one raster
    /// source plus a background and a raster layer.
    pub fn fallback_style() -> Self {
        let style = json!({
            "version": 8,
            "name": "Offline Fallback",
            "sources": {
                "offline-source": {
                    "type": "raster",
                    "tiles": ["/api/maps/tiles/offline/{z}/{x}/{y}.png"],
                    "tileSize": 256
                }
            },
            "layers": [
                {
                    "id": "background",
                    "type": "background",
                    "paint": { "background-color": "#f0f0f0" }
                },
                {
                    "id": "offline-tiles",
                    "type": "raster",
                    "source": "offline-source",
                    "paint": { "raster-opacity": 1 }
                }
            ]
        });

        Self {
            status: 200,
            content_type: "application/json".to_string(),
            body: Bytes::from(style.to_string()),
            served_from: ServedFrom::Fallback,
            offline: true,
        }
    }

    /// Structured 503 error body for a class with no cache and no network.
    ///
    /// Geocoding carries an empty `results` array so callers can distinguish
    /// "no data" from "server error" without special-casing.
    pub fn degraded(class: ResourceClass) -> Self {
        let body = match class {
            ResourceClass::Routing => json!({
                "error": "Routing service unavailable offline",
                "offline": true
            }),
            ResourceClass::Geocoding => json!({
                "error": "Geocoding service unavailable offline",
                "offline": true,
                "results": []
            }),
            _ => json!({
                "error": "Service unavailable offline",
                "offline": true
            }),
        };

        Self {
            status: 503,
            content_type: "application/json".to_string(),
            body: Bytes::from(body.to_string()),
            served_from: ServedFrom::Fallback,
            offline: true,
        }
    }
}
