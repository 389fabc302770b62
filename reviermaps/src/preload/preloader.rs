//! Bulk tile preloader.
//!
//! Downloads every tile of a [`PreloadJob`] plan into the runtime cache
//! partition with bounded concurrency. A handful of failed tiles must not
//! abort the job: each tile gets a small retry budget and is then counted
//! failed and skipped. Cancellation is honored between tiles; in-flight
//! fetches run to completion so no entry is left half-written.

use super::job::PreloadJob;
use crate::backend::AsyncHttpClient;
use crate::cache::{CacheEntry, CacheStore, PartitionHandle};
use crate::coord::TileCoord;
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Preloader tuning knobs.
#[derive(Debug, Clone)]
pub struct PreloadConfig {
    /// Maximum tile fetches in flight (clamped to 1..=8, default 6)
    pub concurrency: usize,
    /// Retries per tile after the first attempt (default 2)
    pub tile_retries: u32,
}

impl Default for PreloadConfig {
    fn default() -> Self {
        Self {
            concurrency: 6,
            tile_retries: 2,
        }
    }
}

/// Outcome of a preload run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreloadReport {
    pub completed: usize,
    pub failed: usize,
    /// True when the run stopped early because the job was cancelled
    pub cancelled: bool,
}

/// Downloads and caches tile pyramids for offline use.
pub struct TilePreloader<C, S> {
    client: Arc<C>,
    store: Arc<S>,
    runtime_partition: PartitionHandle,
    origin: String,
    base_path: String,
    config: PreloadConfig,
}

impl<C, S> TilePreloader<C, S>
where
    C: AsyncHttpClient,
    S: CacheStore,
{
    /// Create a preloader writing through the given runtime partition.
    ///
    /// `base_path` is the interception namespace (e.g. `/api/maps`);
    /// preloaded tiles are keyed by the same request path the strategy
    /// engine uses, so they become cache-first hits afterwards.
    pub fn new(
        client: Arc<C>,
        store: Arc<S>,
        runtime_partition: PartitionHandle,
        origin: impl Into<String>,
        base_path: impl Into<String>,
        config: PreloadConfig,
    ) -> Self {
        Self {
            client,
            store,
            runtime_partition,
            origin: origin.into(),
            base_path: base_path.into(),
            config,
        }
    }

    /// Request path for one tile of a style.
    fn tile_path(&self, style: &str, tile: &TileCoord) -> String {
        format!(
            "{}/tiles/{}/{}/{}/{}.pbf",
            self.base_path, style, tile.zoom, tile.x, tile.y
        )
    }

    /// Fetch one tile with retries; returns whether it was cached.
    async fn fetch_tile(&self, job: &PreloadJob, tile: TileCoord) -> bool {
        let path = self.tile_path(job.style(), &tile);
        let url = format!("{}{}", self.origin, path);

        let mut attempt = 0u32;
        loop {
            match self.client.get(&url).await {
                Ok(response) if response.is_success() => {
                    let entry =
                        CacheEntry::new(response.body.clone(), response.content_type.clone());
                    if let Err(e) = self.store.put(&self.runtime_partition, &path, entry).await {
                        warn!(tile = ?tile, error = %e, "Failed to cache preloaded tile");
                        return false;
                    }
                    return true;
                }
                Ok(response) => {
                    // Permanent resource failure (e.g. 404); not retried and
                    // not negatively cached.
                    debug!(tile = ?tile, status = response.status, "Tile fetch rejected");
                    return false;
                }
                Err(e) => {
                    if attempt >= self.config.tile_retries || job.is_cancelled() {
                        warn!(tile = ?tile, attempts = attempt + 1, error = %e, "Tile abandoned");
                        return false;
                    }
                    attempt += 1;
                    debug!(tile = ?tile, attempt, error = %e, "Retrying tile fetch");
                }
            }
        }
    }

    /// Drive a job to completion or cancellation.
    ///
    /// `on_progress` is invoked with `settled / total` after every tile
    /// settles, successfully or not.
    pub async fn run<F>(&self, job: &PreloadJob, mut on_progress: F) -> PreloadReport
    where
        F: FnMut(f64) + Send,
    {
        let concurrency = self.config.concurrency.clamp(1, 8);
        let total = job.total_tiles();
        info!(
            total,
            concurrency,
            style = job.style(),
            "Starting tile preload"
        );

        let mut pending = job.tiles().iter().copied();
        let mut in_flight = FuturesUnordered::new();
        let mut exhausted = false;

        loop {
            // Issue new fetches while there is capacity and no cancellation.
            while in_flight.len() < concurrency && !exhausted && !job.is_cancelled() {
                match pending.next() {
                    Some(tile) => in_flight.push(async move {
                        let ok = self.fetch_tile(job, tile).await;
                        (tile, ok)
                    }),
                    None => exhausted = true,
                }
            }

            match in_flight.next().await {
                Some((tile, ok)) => {
                    if ok {
                        job.record_success();
                    } else {
                        job.record_failure();
                    }
                    debug!(tile = ?tile, ok, progress = job.progress(), "Tile settled");
                    on_progress(job.progress());
                }
                None => break,
            }
        }

        let report = PreloadReport {
            completed: job.completed_tiles(),
            failed: job.failed_tiles(),
            cancelled: job.is_cancelled(),
        };
        info!(
            completed = report.completed,
            failed = report.failed,
            cancelled = report.cancelled,
            "Tile preload finished"
        );
        report
    }
}
