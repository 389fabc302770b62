//! Route request/result wire types and the routing profile catalog.

use crate::coord::LatLon;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Routing profile selecting cost model and assumed speeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteProfile {
    /// Standard patrol routing
    PolicePatrol,
    /// Minimize travel time
    Fastest,
    /// Minimize travel distance
    Shortest,
}

impl fmt::Display for RouteProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RouteProfile::PolicePatrol => "police_patrol",
            RouteProfile::Fastest => "fastest",
            RouteProfile::Shortest => "shortest",
        };
        write!(f, "{}", s)
    }
}

impl Default for RouteProfile {
    fn default() -> Self {
        RouteProfile::PolicePatrol
    }
}

/// A route calculation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRequest {
    pub start: LatLon,
    pub end: LatLon,
    #[serde(default)]
    pub profile: RouteProfile,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternatives: Option<u32>,
}

impl RouteRequest {
    /// Request with the default profile and no alternatives.
    pub fn new(start: LatLon, end: LatLon) -> Self {
        Self {
            start,
            end,
            profile: RouteProfile::default(),
            alternatives: None,
        }
    }

    /// Select a profile (builder pattern).
    pub fn with_profile(mut self, profile: RouteProfile) -> Self {
        self.profile = profile;
        self
    }
}

/// One leg of a calculated route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteLeg {
    /// Encoded leg geometry (`lat,lon;lat,lon` waypoint pairs)
    pub shape: String,
    pub distance_meters: f64,
    pub duration_seconds: f64,
}

/// Totals over all legs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteSummary {
    pub distance_meters: f64,
    pub duration_seconds: f64,
}

/// A calculated route.
///
/// `is_fallback` marks results produced by the local estimator rather than
/// the live backend; it must reach the presentation layer so degraded
/// results are visually distinguishable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteResult {
    pub legs: Vec<RouteLeg>,
    pub summary: RouteSummary,
    pub profile: RouteProfile,
    #[serde(default)]
    pub is_fallback: bool,
}

impl RouteResult {
    /// Check the summary-equals-leg-sums invariant within floating-point
    /// tolerance.
    pub fn summary_is_consistent(&self) -> bool {
        let leg_total: f64 = self.legs.iter().map(|l| l.distance_meters).sum();
        (leg_total - self.summary.distance_meters).abs() < 1e-6 * leg_total.max(1.0)
    }
}

/// Descriptor for a routing profile offered by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteProfileInfo {
    pub id: String,
    pub name: String,
    pub mode: String,
    pub costing: String,
    pub description: String,
    pub icon: String,
    #[serde(rename = "useCase")]
    pub use_case: String,
}

/// Compiled-in profile catalog used when `/api/maps/profiles` is
/// unreachable and uncached.
pub fn default_route_profiles() -> Vec<RouteProfileInfo> {
    vec![
        RouteProfileInfo {
            id: "police_patrol".to_string(),
            name: "Polizei-Streife (Standard)".to_string(),
            mode: "auto".to_string(),
            costing: "auto".to_string(),
            description: "Standard-Routing für Polizeistreifen".to_string(),
            icon: "🚔".to_string(),
            use_case: "Routine-Patrouillen".to_string(),
        },
        RouteProfileInfo {
            id: "emergency_fast".to_string(),
            name: "Einsatzfahrt (Schnellste)".to_string(),
            mode: "emergency".to_string(),
            costing: "auto".to_string(),
            description: "Optimiert für Einsatzfahrten".to_string(),
            icon: "🚨".to_string(),
            use_case: "Notfall-Einsätze".to_string(),
        },
        RouteProfileInfo {
            id: "pedestrian_safe".to_string(),
            name: "Fußweg (Sicherste)".to_string(),
            mode: "pedestrian".to_string(),
            costing: "pedestrian".to_string(),
            description: "Sichere Fußwege".to_string(),
            icon: "🚶".to_string(),
            use_case: "Fußstreife".to_string(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_serde_names() {
        assert_eq!(
            serde_json::to_string(&RouteProfile::PolicePatrol).unwrap(),
            "\"police_patrol\""
        );
        let parsed: RouteProfile = serde_json::from_str("\"fastest\"").unwrap();
        assert_eq!(parsed, RouteProfile::Fastest);
    }

    #[test]
    fn test_route_request_roundtrip() {
        let req = RouteRequest::new(LatLon::new(48.7758, 9.1829), LatLon::new(49.0069, 8.4037))
            .with_profile(RouteProfile::Shortest);

        let json = serde_json::to_string(&req).unwrap();
        let back: RouteRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(req, back);
    }

    #[test]
    fn test_route_result_wire_names() {
        let result = RouteResult {
            legs: vec![RouteLeg {
                shape: "48.77,9.18;49.00,8.40".to_string(),
                distance_meters: 1000.0,
                duration_seconds: 60.0,
            }],
            summary: RouteSummary {
                distance_meters: 1000.0,
                duration_seconds: 60.0,
            },
            profile: RouteProfile::PolicePatrol,
            is_fallback: true,
        };

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["legs"][0]["distanceMeters"], 1000.0);
        assert_eq!(json["summary"]["durationSeconds"], 60.0);
        assert_eq!(json["isFallback"], true);
    }

    #[test]
    fn test_is_fallback_defaults_to_false() {
        // Backend responses do not carry the flag
        let json = r#"{
            "legs": [],
            "summary": {"distanceMeters": 0.0, "durationSeconds": 0.0},
            "profile": "fastest"
        }"#;
        let result: RouteResult = serde_json::from_str(json).unwrap();
        assert!(!result.is_fallback);
    }

    #[test]
    fn test_summary_consistency_check() {
        let mut result = RouteResult {
            legs: vec![
                RouteLeg {
                    shape: String::new(),
                    distance_meters: 400.0,
                    duration_seconds: 30.0,
                },
                RouteLeg {
                    shape: String::new(),
                    distance_meters: 600.0,
                    duration_seconds: 45.0,
                },
            ],
            summary: RouteSummary {
                distance_meters: 1000.0,
                duration_seconds: 75.0,
            },
            profile: RouteProfile::Fastest,
            is_fallback: false,
        };
        assert!(result.summary_is_consistent());

        result.summary.distance_meters = 900.0;
        assert!(!result.summary_is_consistent());
    }

    #[test]
    fn test_default_profiles_catalog() {
        let profiles = default_route_profiles();
        assert_eq!(profiles.len(), 3);
        assert_eq!(profiles[0].id, "police_patrol");
        assert!(profiles.iter().any(|p| p.mode == "emergency"));
    }
}
