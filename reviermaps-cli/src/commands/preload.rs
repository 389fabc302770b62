//! Bulk tile preload command.

use crate::error::CliError;
use clap::Args;
use reviermaps::coord::BoundingBox;
use std::io::Write;

/// Arguments for the `preload` subcommand.
#[derive(Debug, Args)]
pub struct PreloadArgs {
    /// Northern edge of the bounding box in decimal degrees
    #[arg(long)]
    pub north: f64,

    /// Southern edge of the bounding box in decimal degrees
    #[arg(long)]
    pub south: f64,

    /// Eastern edge of the bounding box in decimal degrees
    #[arg(long)]
    pub east: f64,

    /// Western edge of the bounding box in decimal degrees
    #[arg(long)]
    pub west: f64,

    /// Minimum zoom level
    #[arg(long, default_value = "8")]
    pub min_zoom: u8,

    /// Maximum zoom level
    #[arg(long, default_value = "14")]
    pub max_zoom: u8,

    /// Map style to preload tiles for
    #[arg(long, default_value = "streets")]
    pub style: String,
}

/// Preload tiles for a bounding box, printing progress.
pub async fn run(origin: &str, args: PreloadArgs) -> Result<(), CliError> {
    let bounds = BoundingBox::new(args.north, args.south, args.east, args.west)
        .map_err(|e| CliError::InvalidInput(e.to_string()))?;

    let service = super::common::build_service(origin).await?;

    let job = service
        .plan_preload(&args.style, bounds, args.min_zoom, args.max_zoom)
        .map_err(CliError::Service)?;
    println!(
        "Preloading {} tiles (zoom {}..={})...",
        job.total_tiles(),
        args.min_zoom,
        args.max_zoom
    );

    let report = service
        .run_preload(&job, |progress| {
            print!("\r{:.0}%", progress * 100.0);
            let _ = std::io::stdout().flush();
        })
        .await;
    println!();

    println!(
        "Done: {} cached, {} failed",
        report.completed, report.failed
    );
    Ok(())
}
