//! Coordinate conversion module
//!
//! Provides conversions between geographic coordinates (latitude/longitude)
//! and Slippy Map tile coordinates, tile enumeration for bounding boxes, and
//! great-circle distance used by the fallback route calculator.

mod types;

pub use types::{
    BoundingBox, CoordError, LatLon, TileCoord, TileRect, TileRectIterator, MAX_LAT, MAX_LON,
    MAX_ZOOM, MIN_LAT, MIN_LON, MIN_ZOOM,
};

use std::f64::consts::PI;

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Converts geographic coordinates to tile coordinates.
///
/// # Arguments
///
/// * `lat` - Latitude in degrees (-85.05112878 to 85.05112878)
/// * `lon` - Longitude in degrees (-180.0 to 180.0)
/// * `zoom` - Zoom level (0 to 18)
///
/// # Returns
///
/// A `Result` containing the tile coordinates or an error if inputs are invalid.
#[inline]
pub fn to_tile_coords(lat: f64, lon: f64, zoom: u8) -> Result<TileCoord, CoordError> {
    // Validate inputs
    if !(MIN_LAT..=MAX_LAT).contains(&lat) {
        return Err(CoordError::InvalidLatitude(lat));
    }
    if !(MIN_LON..=MAX_LON).contains(&lon) {
        return Err(CoordError::InvalidLongitude(lon));
    }
    if zoom > MAX_ZOOM {
        return Err(CoordError::InvalidZoom(zoom));
    }

    // Number of tiles along each axis at this zoom level
    let n = 2.0_f64.powi(zoom as i32);

    // Longitude maps linearly to the X axis
    let x = (((lon + 180.0) / 360.0 * n) as u32).min(n as u32 - 1);

    // Latitude maps through the Web Mercator projection to the Y axis
    let lat_rad = lat * PI / 180.0;
    let y = (((1.0 - lat_rad.tan().asinh() / PI) / 2.0 * n) as u32).min(n as u32 - 1);

    Ok(TileCoord { x, y, zoom })
}

/// Converts tile coordinates back to geographic coordinates.
///
/// Returns the latitude/longitude of the tile's northwest corner.
#[inline]
pub fn tile_to_lat_lon(tile: &TileCoord) -> (f64, f64) {
    let n = 2.0_f64.powi(tile.zoom as i32);

    let lon = tile.x as f64 / n * 360.0 - 180.0;

    let y = tile.y as f64 / n;
    let lat_rad = (PI * (1.0 - 2.0 * y)).sinh().atan();
    let lat = lat_rad * 180.0 / PI;

    (lat, lon)
}

/// Computes the tile rectangle covering a bounding box at one zoom level.
///
/// The rectangle spans from the tile containing the northwest corner to the
/// tile containing the southeast corner, inclusive.
pub fn tile_rect(bounds: &BoundingBox, zoom: u8) -> Result<TileRect, CoordError> {
    let nw = to_tile_coords(bounds.north, bounds.west, zoom)?;
    let se = to_tile_coords(bounds.south, bounds.east, zoom)?;

    Ok(TileRect {
        min_x: nw.x,
        max_x: se.x,
        min_y: nw.y,
        max_y: se.y,
        zoom,
    })
}

/// Great-circle distance between two points in meters (haversine formula).
pub fn great_circle_distance_m(a: &LatLon, b: &LatLon) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lon / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}
