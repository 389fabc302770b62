//! High-level service facade for the offline map subsystem.
//!
//! Encapsulates component wiring behind [`OfflineMapService`], following the
//! Facade pattern. The HTTP client and cache store are injected, so tests
//! run against mocks instead of global state.
//!
//! # Example
//!
//! ```ignore
//! use reviermaps::backend::ReqwestClient;
//! use reviermaps::cache::MemoryCacheStore;
//! use reviermaps::network::NetworkMonitor;
//! use reviermaps::service::{OfflineMapService, ServiceConfig};
//! use std::sync::Arc;
//!
//! let client = Arc::new(ReqwestClient::new()?);
//! let store = Arc::new(MemoryCacheStore::new());
//! let monitor = Arc::new(NetworkMonitor::default());
//!
//! let service = OfflineMapService::new(
//!     ServiceConfig::default().with_origin("http://localhost:8080"),
//!     client,
//!     store,
//!     monitor,
//! )
//! .await?;
//! service.activate().await?;
//! ```

mod config;
mod error;
mod facade;
mod push;
mod types;

pub use config::ServiceConfig;
pub use error::ServiceError;
pub use facade::OfflineMapService;
pub use push::{Notification, NotificationAction, PushMessage};
pub use types::{ActivationSummary, GeocodeHit, GeocodeResponse, OfflineCapabilities};
