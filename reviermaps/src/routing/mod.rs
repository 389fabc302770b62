//! Route model and the offline fallback calculator.

mod fallback;
mod types;

pub use fallback::{FallbackRouteCalculator, ProfileSpeeds, DEFAULT_ROAD_FACTOR};
pub use types::{
    default_route_profiles, RouteLeg, RouteProfile, RouteProfileInfo, RouteRequest, RouteResult,
    RouteSummary,
};
