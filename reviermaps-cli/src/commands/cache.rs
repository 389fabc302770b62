//! Cache management commands.

use crate::error::CliError;
use clap::Subcommand;

/// Cache subcommands.
#[derive(Debug, Subcommand)]
pub enum CacheCommand {
    /// Print cache statistics
    Stats,
    /// Delete all cached map data
    Clear,
}

/// Run a cache subcommand.
pub async fn run(origin: &str, command: CacheCommand) -> Result<(), CliError> {
    let service = super::common::build_service(origin).await?;

    match command {
        CacheCommand::Stats => {
            let stats = service.cache_stats();
            println!("Entries:   {}", stats.entry_count);
            println!("Size:      {} KiB", stats.size_bytes / 1024);
            println!("Hits:      {}", stats.hits);
            println!("Misses:    {}", stats.misses);
            println!("Hit rate:  {:.1}%", stats.hit_rate() * 100.0);
            println!("Evictions: {}", stats.evictions);
        }
        CacheCommand::Clear => {
            service.clear_offline_cache().await?;
            println!("Offline cache cleared.");
        }
    }
    Ok(())
}
