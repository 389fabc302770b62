//! Network connectivity monitoring.
//!
//! Tracks online/offline transitions and connection-quality hints and exposes
//! the last-known [`NetworkStatus`] to the caching strategies, the service
//! facade and the sync queue.

mod monitor;
mod types;

pub use monitor::NetworkMonitor;
pub use types::{EffectiveType, NetworkStatus};
