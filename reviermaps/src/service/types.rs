//! Facade-level wire types.

use serde::{Deserialize, Serialize};

/// Availability of the offline backend services.
///
/// Fetched from `/api/maps/capabilities`. `offline_mode` set by the backend
/// forces offline behavior even while the platform reports connectivity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfflineCapabilities {
    #[serde(default)]
    pub osrm: bool,
    #[serde(default)]
    pub valhalla: bool,
    #[serde(default)]
    pub tileserver: bool,
    #[serde(default)]
    pub nominatim: bool,
    #[serde(default)]
    pub offline_mode: bool,
}

/// One geocoding match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeHit {
    pub lat: f64,
    pub lon: f64,
    pub display_name: String,
    #[serde(default)]
    pub importance: f64,
    #[serde(default)]
    pub place_id: String,
}

/// Geocoding results with degradation marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResponse {
    pub results: Vec<GeocodeHit>,
    /// True when the results were synthesized offline (always empty then)
    #[serde(default)]
    pub offline: bool,
}

/// Summary of a service activation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivationSummary {
    /// Stale partitions removed by the namespace purge
    pub purged_partitions: usize,
    /// Manifest entries fetched and cached successfully
    pub precached: usize,
}
