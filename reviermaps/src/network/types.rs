//! Network status types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse connection-quality classification reported by the platform.
///
/// Mirrors the effective connection types exposed by browser network
/// information APIs; `None` in [`NetworkStatus`] means the platform does not
/// expose the hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectiveType {
    #[serde(rename = "slow-2g")]
    Slow2g,
    #[serde(rename = "2g")]
    TwoG,
    #[serde(rename = "3g")]
    ThreeG,
    #[serde(rename = "4g")]
    FourG,
}

impl fmt::Display for EffectiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EffectiveType::Slow2g => "slow-2g",
            EffectiveType::TwoG => "2g",
            EffectiveType::ThreeG => "3g",
            EffectiveType::FourG => "4g",
        };
        write!(f, "{}", s)
    }
}

/// Last-known network state.
///
/// Quality fields are hints and stay `None` when the platform does not
/// report them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NetworkStatus {
    /// Whether the platform currently reports connectivity
    pub online: bool,
    /// Coarse connection classification, if known
    pub effective_type: Option<EffectiveType>,
    /// Downstream bandwidth estimate in megabits per second, if known
    pub downlink_mbps: Option<f64>,
    /// Round-trip time estimate in milliseconds, if known
    pub rtt_ms: Option<u32>,
}

impl NetworkStatus {
    /// Status for a connection that is online with no quality hints.
    pub fn online() -> Self {
        Self {
            online: true,
            effective_type: None,
            downlink_mbps: None,
            rtt_ms: None,
        }
    }

    /// Status for an offline connection.
    pub fn offline() -> Self {
        Self {
            online: false,
            effective_type: None,
            downlink_mbps: None,
            rtt_ms: None,
        }
    }
}

impl Default for NetworkStatus {
    fn default() -> Self {
        Self::online()
    }
}
