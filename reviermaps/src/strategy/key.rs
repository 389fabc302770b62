//! Cache-key derivation.
//!
//! GET requests are keyed by their canonical path. POST requests (routing,
//! geocoding) are keyed by the path with a SHA-256 digest of the body
//! appended as a query parameter, so distinct request bodies never collide
//! and identical repeated queries hit the same entry deterministically.

use crate::router::{MapRequest, Method};
use sha2::{Digest, Sha256};

/// Derive the cache key for a request.
pub fn derive_cache_key(request: &MapRequest) -> String {
    match request.method {
        Method::Get => request.path.clone(),
        Method::Post => {
            let body = request.body.as_deref().unwrap_or_default();
            let digest = hex::encode(Sha256::digest(body));
            let separator = if request.path.contains('?') { '&' } else { '?' };
            format!("{}{}body_hash={}", request.path, separator, digest)
        }
    }
}
