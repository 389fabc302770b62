//! Address lookup command.

use crate::error::CliError;
use clap::Args;

/// Arguments for the `geocode` subcommand.
#[derive(Debug, Args)]
pub struct GeocodeArgs {
    /// Address or place name to look up
    pub query: String,
}

/// Geocode a query and print the matches.
pub async fn run(origin: &str, args: GeocodeArgs) -> Result<(), CliError> {
    let service = super::common::build_service(origin).await?;

    let response = service.geocode(&args.query).await;

    if response.offline && response.results.is_empty() {
        println!("Geocoding unavailable offline and no cached results for this query.");
        return Ok(());
    }

    for hit in &response.results {
        println!("{:.5}, {:.5}  {}", hit.lat, hit.lon, hit.display_name);
    }
    if response.results.is_empty() {
        println!("No matches.");
    }
    Ok(())
}
