//! Preload job state.

use crate::coord::{tile_rect, BoundingBox, CoordError, TileCoord};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Shared, cancellable state of one bulk tile preload.
///
/// Cheap to clone; all clones observe the same counters and cancellation
/// flag, so a UI can hold one clone for progress display and cancellation
/// while the preloader drives another.
#[derive(Debug, Clone)]
pub struct PreloadJob {
    style: String,
    bounds: BoundingBox,
    min_zoom: u8,
    max_zoom: u8,
    tiles: Arc<Vec<TileCoord>>,
    state: Arc<JobState>,
}

#[derive(Debug)]
struct JobState {
    completed: AtomicUsize,
    failed: AtomicUsize,
    cancel: CancellationToken,
}

impl PreloadJob {
    /// Plan a preload: enumerate the tile grid for every zoom level in
    /// `[min_zoom, max_zoom]` over the bounding box.
    pub fn plan(
        style: impl Into<String>,
        bounds: BoundingBox,
        min_zoom: u8,
        max_zoom: u8,
    ) -> Result<Self, CoordError> {
        if min_zoom > max_zoom {
            return Err(CoordError::InvalidZoom(min_zoom));
        }

        let mut tiles = Vec::new();
        for zoom in min_zoom..=max_zoom {
            let rect = tile_rect(&bounds, zoom)?;
            tiles.extend(rect.tiles());
        }

        Ok(Self {
            style: style.into(),
            bounds,
            min_zoom,
            max_zoom,
            tiles: Arc::new(tiles),
            state: Arc::new(JobState {
                completed: AtomicUsize::new(0),
                failed: AtomicUsize::new(0),
                cancel: CancellationToken::new(),
            }),
        })
    }

    /// Style the tiles belong to.
    pub fn style(&self) -> &str {
        &self.style
    }

    /// Geographic bounds of the preload.
    pub fn bounds(&self) -> BoundingBox {
        self.bounds
    }

    pub fn min_zoom(&self) -> u8 {
        self.min_zoom
    }

    pub fn max_zoom(&self) -> u8 {
        self.max_zoom
    }

    /// All tiles in the plan.
    pub fn tiles(&self) -> &[TileCoord] {
        &self.tiles
    }

    /// Number of tiles in the plan.
    pub fn total_tiles(&self) -> usize {
        self.tiles.len()
    }

    /// Tiles fetched and cached so far.
    pub fn completed_tiles(&self) -> usize {
        self.state.completed.load(Ordering::SeqCst)
    }

    /// Tiles abandoned after exhausting their retry budget.
    pub fn failed_tiles(&self) -> usize {
        self.state.failed.load(Ordering::SeqCst)
    }

    /// Fraction of tiles settled (completed or failed), 0.0 to 1.0.
    pub fn progress(&self) -> f64 {
        let total = self.total_tiles();
        if total == 0 {
            return 1.0;
        }
        (self.completed_tiles() + self.failed_tiles()) as f64 / total as f64
    }

    /// Request cancellation. Tiles already in flight complete; no new
    /// fetches are issued afterwards.
    pub fn cancel(&self) {
        self.state.cancel.cancel();
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.state.cancel.is_cancelled()
    }

    pub(crate) fn record_success(&self) {
        self.state.completed.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn record_failure(&self) {
        self.state.failed.fetch_add(1, Ordering::SeqCst);
    }
}
