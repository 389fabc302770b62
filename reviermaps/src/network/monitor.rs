//! Shared network status monitor.
//!
//! Adapters for platform connectivity signals call [`NetworkMonitor::set_online`]
//! and [`NetworkMonitor::update_quality`]; every other component reads the
//! last-known state through [`NetworkMonitor::status`]. The monitor performs
//! no network I/O of its own and never fails; it only reports the best-known
//! state.

use super::types::{EffectiveType, NetworkStatus};
use std::sync::RwLock;
use tokio::sync::watch;
use tracing::info;

/// Tracks online/offline transitions and connection-quality hints.
///
/// Status updates are applied atomically under a write lock; reads are cheap
/// copies of the current value. An offline→online transition additionally
/// notifies reconnect subscribers, which is what triggers the background
/// sync queue drain.
#[derive(Debug)]
pub struct NetworkMonitor {
    status: RwLock<NetworkStatus>,
    reconnect_tx: watch::Sender<u64>,
}

impl NetworkMonitor {
    /// Create a monitor with the given initial status.
    pub fn new(initial: NetworkStatus) -> Self {
        let (reconnect_tx, _) = watch::channel(0);
        Self {
            status: RwLock::new(initial),
            reconnect_tx,
        }
    }

    /// Current last-known status. Synchronous and infallible.
    pub fn status(&self) -> NetworkStatus {
        *self.status.read().unwrap_or_else(|e| e.into_inner())
    }

    /// Shorthand for `status().online`.
    pub fn is_online(&self) -> bool {
        self.status().online
    }

    /// Apply an online/offline transition from the platform.
    ///
    /// Going from offline to online bumps the reconnect signal observed by
    /// [`NetworkMonitor::subscribe_reconnect`] receivers.
    pub fn set_online(&self, online: bool) {
        let was_online = {
            let mut status = self.status.write().unwrap_or_else(|e| e.into_inner());
            let was = status.online;
            status.online = online;
            was
        };

        if online && !was_online {
            info!("Network connectivity restored");
            self.reconnect_tx.send_modify(|n| *n += 1);
        } else if !online && was_online {
            info!("Network connectivity lost, entering offline mode");
        }
    }

    /// Apply a connection-quality change from the platform.
    ///
    /// Fields the platform does not expose are passed as `None` and recorded
    /// as unknown.
    pub fn update_quality(
        &self,
        effective_type: Option<EffectiveType>,
        downlink_mbps: Option<f64>,
        rtt_ms: Option<u32>,
    ) {
        let mut status = self.status.write().unwrap_or_else(|e| e.into_inner());
        status.effective_type = effective_type;
        status.downlink_mbps = downlink_mbps;
        status.rtt_ms = rtt_ms;
    }

    /// Subscribe to reconnect events.
    ///
    /// The receiver observes a change whenever connectivity transitions from
    /// offline to online. The carried counter only exists to make each
    /// transition observable; its value is meaningless.
    pub fn subscribe_reconnect(&self) -> watch::Receiver<u64> {
        self.reconnect_tx.subscribe()
    }
}

impl Default for NetworkMonitor {
    fn default() -> Self {
        Self::new(NetworkStatus::online())
    }
}
