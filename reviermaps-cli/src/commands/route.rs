//! Route calculation command.

use crate::error::CliError;
use clap::Args;
use reviermaps::coord::LatLon;
use reviermaps::routing::{RouteProfile, RouteRequest};

/// Arguments for the `route` subcommand.
#[derive(Debug, Args)]
pub struct RouteArgs {
    /// Start latitude in decimal degrees
    #[arg(long)]
    pub from_lat: f64,

    /// Start longitude in decimal degrees
    #[arg(long)]
    pub from_lon: f64,

    /// Destination latitude in decimal degrees
    #[arg(long)]
    pub to_lat: f64,

    /// Destination longitude in decimal degrees
    #[arg(long)]
    pub to_lon: f64,

    /// Routing profile
    #[arg(long, default_value = "police-patrol")]
    pub profile: CliProfile,
}

#[derive(Debug, Clone, clap::ValueEnum)]
pub enum CliProfile {
    PolicePatrol,
    Fastest,
    Shortest,
}

impl From<CliProfile> for RouteProfile {
    fn from(p: CliProfile) -> Self {
        match p {
            CliProfile::PolicePatrol => RouteProfile::PolicePatrol,
            CliProfile::Fastest => RouteProfile::Fastest,
            CliProfile::Shortest => RouteProfile::Shortest,
        }
    }
}

/// Calculate and print a route.
pub async fn run(origin: &str, args: RouteArgs) -> Result<(), CliError> {
    let service = super::common::build_service(origin).await?;

    let request = RouteRequest::new(
        LatLon::new(args.from_lat, args.from_lon),
        LatLon::new(args.to_lat, args.to_lon),
    )
    .with_profile(args.profile.into());

    let route = service.calculate_route(&request).await;

    println!(
        "Route ({}): {:.1} km, {:.0} min{}",
        route.profile,
        route.summary.distance_meters / 1000.0,
        route.summary.duration_seconds / 60.0,
        if route.is_fallback {
            " [approximate offline estimate]"
        } else {
            ""
        }
    );
    for (i, leg) in route.legs.iter().enumerate() {
        println!(
            "  Leg {}: {:.1} km, {:.0} min",
            i + 1,
            leg.distance_meters / 1000.0,
            leg.duration_seconds / 60.0
        );
    }
    Ok(())
}
