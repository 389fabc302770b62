//! Per-class caching policy configuration.

use crate::router::ResourceClass;
use std::time::Duration;

/// The two caching strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    /// Consult the cache before the network; only fetch on a miss.
    CacheFirst,
    /// Attempt the network first; fall back to cache on failure or timeout.
    NetworkFirst,
}

/// Network timeout budgets per resource class.
///
/// These are policy choices, not protocol requirements; override the
/// defaults through [`crate::service::ServiceConfig`].
#[derive(Debug, Clone)]
pub struct PolicyConfig {
    /// Style document fetch budget (default 5s)
    pub style_timeout: Duration,
    /// Route calculation budget (default 10s)
    pub routing_timeout: Duration,
    /// Geocoding budget (default 8s)
    pub geocoding_timeout: Duration,
    /// Budget for everything else under the namespace (default 5s)
    pub generic_timeout: Duration,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            style_timeout: Duration::from_secs(5),
            routing_timeout: Duration::from_secs(10),
            geocoding_timeout: Duration::from_secs(8),
            generic_timeout: Duration::from_secs(5),
        }
    }
}

impl PolicyConfig {
    /// Strategy applied to a resource class.
    pub fn strategy_for(&self, class: ResourceClass) -> StrategyKind {
        match class {
            ResourceClass::Tile => StrategyKind::CacheFirst,
            ResourceClass::Style
            | ResourceClass::Routing
            | ResourceClass::Geocoding
            | ResourceClass::Generic => StrategyKind::NetworkFirst,
        }
    }

    /// Network budget for a class; tiles have none (cache-first fetches are
    /// not raced against a timer).
    pub fn timeout_for(&self, class: ResourceClass) -> Option<Duration> {
        match class {
            ResourceClass::Tile => None,
            ResourceClass::Style => Some(self.style_timeout),
            ResourceClass::Routing => Some(self.routing_timeout),
            ResourceClass::Geocoding => Some(self.geocoding_timeout),
            ResourceClass::Generic => Some(self.generic_timeout),
        }
    }
}
