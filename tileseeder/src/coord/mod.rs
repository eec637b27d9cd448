//! Coordinate conversion module
//!
//! Provides conversions from geographic coordinates (latitude/longitude)
//! to Web Mercator tile indices as used by XYZ tile services.

mod types;

pub use types::{TileAddress, MAX_LAT, MAX_LON, MAX_ZOOM, MIN_LAT, MIN_LON, MIN_ZOOM};

use std::f64::consts::PI;

/// Converts a longitude to the tile column containing it at the given zoom.
///
/// Out-of-range longitudes are clamped to [-180, 180] and the resulting
/// index is clamped to the valid range [0, 2^zoom - 1], so a bounding box
/// edge sitting exactly on the antimeridian still maps to a real tile.
#[inline]
pub fn col_for_lon(lon: f64, zoom: u8) -> u32 {
    let n = 2.0_f64.powi(zoom as i32);
    let lon = lon.clamp(MIN_LON, MAX_LON);
    let col = ((lon + 180.0) / 360.0 * n).floor() as i64;
    clamp_index(col, zoom)
}

/// Converts a latitude to the tile row containing it at the given zoom.
///
/// Row 0 is at the northern edge. Latitudes beyond the Web Mercator valid
/// range (including poleward of the projection limit) are clamped, never
/// rejected.
#[inline]
pub fn row_for_lat(lat: f64, zoom: u8) -> u32 {
    let n = 2.0_f64.powi(zoom as i32);
    let lat = lat.clamp(MIN_LAT, MAX_LAT);
    let lat_rad = lat * PI / 180.0;
    let row = ((1.0 - lat_rad.tan().asinh() / PI) / 2.0 * n).floor() as i64;
    clamp_index(row, zoom)
}

#[inline]
fn clamp_index(index: i64, zoom: u8) -> u32 {
    let max = (1_i64 << zoom.min(MAX_ZOOM)) - 1;
    index.clamp(0, max) as u32
}
