//! Fallback route calculator.
//!
//! Last line of defense for routing requests: when both the network and the
//! cache fail, an approximate route is produced from the great-circle
//! distance scaled by a road-network inefficiency factor. Never fails.

use super::types::{RouteLeg, RouteRequest, RouteResult, RouteProfile, RouteSummary};
use crate::coord::great_circle_distance_m;
use tracing::debug;

/// Default ratio between road distance and great-circle distance.
pub const DEFAULT_ROAD_FACTOR: f64 = 1.3;

/// Assumed average speeds per profile, in km/h.
#[derive(Debug, Clone)]
pub struct ProfileSpeeds {
    pub police_patrol_kmh: f64,
    pub fastest_kmh: f64,
    pub shortest_kmh: f64,
}

impl Default for ProfileSpeeds {
    fn default() -> Self {
        Self {
            police_patrol_kmh: 50.0,
            fastest_kmh: 80.0,
            shortest_kmh: 40.0,
        }
    }
}

impl ProfileSpeeds {
    /// Speed for a profile, clamped to a sane minimum so the estimate can
    /// never divide by zero.
    pub fn speed_for(&self, profile: RouteProfile) -> f64 {
        let kmh = match profile {
            RouteProfile::PolicePatrol => self.police_patrol_kmh,
            RouteProfile::Fastest => self.fastest_kmh,
            RouteProfile::Shortest => self.shortest_kmh,
        };
        kmh.max(1.0)
    }
}

/// Produces approximate routes from straight-line heuristics.
#[derive(Debug, Clone)]
pub struct FallbackRouteCalculator {
    road_factor: f64,
    speeds: ProfileSpeeds,
}

impl FallbackRouteCalculator {
    /// Calculator with the default road factor and speeds.
    pub fn new() -> Self {
        Self {
            road_factor: DEFAULT_ROAD_FACTOR,
            speeds: ProfileSpeeds::default(),
        }
    }

    /// Override the road inefficiency factor (builder pattern).
    pub fn with_road_factor(mut self, factor: f64) -> Self {
        self.road_factor = factor;
        self
    }

    /// Override the assumed speeds (builder pattern).
    pub fn with_speeds(mut self, speeds: ProfileSpeeds) -> Self {
        self.speeds = speeds;
        self
    }

    /// Compute an approximate route. Infallible; the result is always
    /// usable and flagged `is_fallback`.
    pub fn compute(&self, request: &RouteRequest) -> RouteResult {
        let crow_m = great_circle_distance_m(&request.start, &request.end);
        let distance_meters = crow_m * self.road_factor;

        let speed_ms = self.speeds.speed_for(request.profile) / 3.6;
        let duration_seconds = distance_meters / speed_ms;

        debug!(
            distance_m = distance_meters as u64,
            duration_s = duration_seconds as u64,
            profile = %request.profile,
            "Computed fallback route"
        );

        let shape = format!("{};{}", request.start, request.end);

        RouteResult {
            legs: vec![RouteLeg {
                shape,
                distance_meters,
                duration_seconds,
            }],
            summary: RouteSummary {
                distance_meters,
                duration_seconds,
            },
            profile: request.profile,
            is_fallback: true,
        }
    }
}

impl Default for FallbackRouteCalculator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::LatLon;

    fn stuttgart() -> LatLon {
        LatLon::new(48.7758, 9.1829)
    }

    fn karlsruhe() -> LatLon {
        LatLon::new(49.0069, 8.4037)
    }

    #[test]
    fn test_same_point_is_zero() {
        let calc = FallbackRouteCalculator::new();
        let result = calc.compute(&RouteRequest::new(stuttgart(), stuttgart()));

        assert_eq!(result.summary.distance_meters, 0.0);
        assert_eq!(result.summary.duration_seconds, 0.0);
        assert!(result.is_fallback);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let calc = FallbackRouteCalculator::new();
        let ab = calc.compute(&RouteRequest::new(stuttgart(), karlsruhe()));
        let ba = calc.compute(&RouteRequest::new(karlsruhe(), stuttgart()));

        assert!(
            (ab.summary.distance_meters - ba.summary.distance_meters).abs() < 1e-6,
            "forward and reverse distances must match"
        );
    }

    #[test]
    fn test_road_factor_applied() {
        let calc = FallbackRouteCalculator::new();
        let result = calc.compute(&RouteRequest::new(stuttgart(), karlsruhe()));

        // ~62.5 km as the crow flies, scaled by 1.3
        let expected = 62_494.0 * 1.3;
        assert!(
            (result.summary.distance_meters - expected).abs() < 200.0,
            "distance was {}",
            result.summary.distance_meters
        );
    }

    #[test]
    fn test_faster_profile_estimates_shorter_duration() {
        let calc = FallbackRouteCalculator::new();
        let patrol = calc.compute(
            &RouteRequest::new(stuttgart(), karlsruhe()).with_profile(RouteProfile::PolicePatrol),
        );
        let fastest = calc.compute(
            &RouteRequest::new(stuttgart(), karlsruhe()).with_profile(RouteProfile::Fastest),
        );

        assert!(fastest.summary.duration_seconds < patrol.summary.duration_seconds);
        assert_eq!(patrol.summary.distance_meters, fastest.summary.distance_meters);
    }

    #[test]
    fn test_duration_matches_assumed_speed() {
        let calc = FallbackRouteCalculator::new();
        let result = calc.compute(
            &RouteRequest::new(stuttgart(), karlsruhe()).with_profile(RouteProfile::PolicePatrol),
        );

        // 50 km/h on the adjusted distance
        let expected = result.summary.distance_meters / (50.0 / 3.6);
        assert!((result.summary.duration_seconds - expected).abs() < 1e-6);
    }

    #[test]
    fn test_summary_matches_legs() {
        let calc = FallbackRouteCalculator::new();
        let result = calc.compute(&RouteRequest::new(stuttgart(), karlsruhe()));

        assert_eq!(result.legs.len(), 1);
        assert!(result.summary_is_consistent());
    }

    #[test]
    fn test_shape_encodes_endpoints() {
        let calc = FallbackRouteCalculator::new();
        let result = calc.compute(&RouteRequest::new(stuttgart(), karlsruhe()));

        assert_eq!(result.legs[0].shape, "48.7758,9.1829;49.0069,8.4037");
    }

    #[test]
    fn test_zero_configured_speed_is_clamped() {
        let calc = FallbackRouteCalculator::new().with_speeds(ProfileSpeeds {
            police_patrol_kmh: 0.0,
            fastest_kmh: 0.0,
            shortest_kmh: 0.0,
        });
        let result = calc.compute(&RouteRequest::new(stuttgart(), karlsruhe()));

        assert!(result.summary.duration_seconds.is_finite());
    }
}
