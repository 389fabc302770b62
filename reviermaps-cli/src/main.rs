//! reviermaps CLI - command-line interface
//!
//! Drives the offline map service from the terminal: route calculation,
//! geocoding, bulk tile preloads and cache management.

mod commands;
mod error;

use clap::{Parser, Subcommand};
use commands::{cache, geocode, preload, route};
use error::CliError;
use reviermaps::logging::{default_log_dir, default_log_file, init_logging};

#[derive(Parser)]
#[command(name = "reviermaps")]
#[command(version = reviermaps::VERSION)]
#[command(about = "Offline map & routing cache for RevierKompass", long_about = None)]
struct Cli {
    /// Backend origin (e.g. http://localhost:8080); empty for same-origin
    #[arg(long, global = true, default_value = "")]
    origin: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Calculate a route between two points
    Route(route::RouteArgs),
    /// Look up an address
    Geocode(geocode::GeocodeArgs),
    /// Preload tiles for a bounding box
    Preload(preload::PreloadArgs),
    /// Inspect or clear the offline cache
    Cache {
        #[command(subcommand)]
        command: cache::CacheCommand,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let _logging_guard = match init_logging(default_log_dir(), default_log_file()) {
        Ok(guard) => guard,
        Err(e) => CliError::LoggingInit(e.to_string()).exit(),
    };

    let result = match cli.command {
        Command::Route(args) => route::run(&cli.origin, args).await,
        Command::Geocode(args) => geocode::run(&cli.origin, args).await,
        Command::Preload(args) => preload::run(&cli.origin, args).await,
        Command::Cache { command } => cache::run(&cli.origin, command).await,
    };

    if let Err(e) = result {
        e.exit();
    }
}
