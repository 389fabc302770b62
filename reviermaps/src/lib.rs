//! reviermaps - offline map & routing cache layer for RevierKompass
//!
//! This library provides the client-resident offline subsystem of the
//! station locator: request interception with per-class caching strategies,
//! graceful degradation when backends are unreachable, approximate fallback
//! routing, bulk tile preloading, and replay of mutations queued offline.
//!
//! # High-Level API
//!
//! Most callers go through the [`service`] facade:
//!
//! ```ignore
//! use reviermaps::service::{OfflineMapService, ServiceConfig};
//!
//! let service = OfflineMapService::new(config, client, store, monitor).await?;
//! service.activate().await?;
//!
//! let route = service.calculate_route(&request).await;
//! if route.is_fallback {
//!     // mark degraded accuracy in the UI
//! }
//! ```

pub mod backend;
pub mod cache;
pub mod coord;
pub mod logging;
pub mod network;
pub mod preload;
pub mod router;
pub mod routing;
pub mod service;
pub mod strategy;
pub mod sync;

/// Version of the reviermaps library and CLI.
///
/// Synchronized across all workspace components; defined in `Cargo.toml`
/// and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
