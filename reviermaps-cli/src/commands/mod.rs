//! CLI command implementations.
//!
//! - [`cache`] - Cache management (stats, clear)
//! - [`common`] - Shared service construction
//! - [`geocode`] - Address lookup
//! - [`preload`] - Bulk tile preload for a bounding box
//! - [`route`] - Route calculation

pub mod cache;
pub mod common;
pub mod geocode;
pub mod preload;
pub mod route;
