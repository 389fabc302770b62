//! Service configuration.

use crate::cache::CacheNamespace;
use crate::preload::PreloadConfig;
use crate::routing::{ProfileSpeeds, DEFAULT_ROAD_FACTOR};
use crate::strategy::PolicyConfig;
use crate::sync::DEFAULT_RETRY_BUDGET;

/// Configuration for the offline map service.
///
/// Every timeout and retry budget in the subsystem is set here; the
/// compiled-in values are defaults, not protocol requirements.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Origin prepended to request paths when talking to the backend
    /// (empty for same-origin deployments)
    pub origin: String,
    /// Interception namespace
    pub namespace: String,
    /// Cache partition prefix
    pub cache_service_name: String,
    /// Cache version tag; bumping it rotates the static partition
    pub cache_version: String,
    /// Per-class network budgets
    pub policies: PolicyConfig,
    /// Preloader tuning
    pub preload: PreloadConfig,
    /// Replay attempts per queued offline operation
    pub sync_retry_budget: u32,
    /// Road-network inefficiency factor for fallback routes
    pub road_factor: f64,
    /// Assumed speeds for fallback durations
    pub speeds: ProfileSpeeds,
    /// Paths fetched and cached eagerly at activation
    pub precache_manifest: Vec<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            origin: String::new(),
            namespace: "/api/maps".to_string(),
            cache_service_name: "revierkompass-maps".to_string(),
            cache_version: "v1".to_string(),
            policies: PolicyConfig::default(),
            preload: PreloadConfig::default(),
            sync_retry_budget: DEFAULT_RETRY_BUDGET,
            road_factor: DEFAULT_ROAD_FACTOR,
            speeds: ProfileSpeeds::default(),
            precache_manifest: vec![
                "/api/maps/capabilities".to_string(),
                "/api/maps/styles".to_string(),
                "/api/maps/profiles".to_string(),
            ],
        }
    }
}

impl ServiceConfig {
    /// Set the backend origin (builder pattern).
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }

    /// Set the cache version tag (builder pattern).
    pub fn with_cache_version(mut self, version: impl Into<String>) -> Self {
        self.cache_version = version.into();
        self
    }

    /// Override the per-class policies (builder pattern).
    pub fn with_policies(mut self, policies: PolicyConfig) -> Self {
        self.policies = policies;
        self
    }

    /// Override the preload tuning (builder pattern).
    pub fn with_preload(mut self, preload: PreloadConfig) -> Self {
        self.preload = preload;
        self
    }

    /// Cache namespace derived from service name and version.
    pub fn cache_namespace(&self) -> CacheNamespace {
        CacheNamespace::new(&self.cache_service_name, &self.cache_version)
    }
}
