//! Map-unit grid walk planning.
//!
//! Plans tile matrices for backend-tiled maps: each base layer group is
//! tiled at every finite display scale the map defines. Tile cells are
//! anchored at the top-left corner of the map's full extent (row 0 north,
//! column 0 west), and their size in map units follows from the scale
//! denominator, the display DPI, and the map's meters-per-unit.

use super::{MapBounds, TileMatrix, WalkError};
use std::sync::Arc;

/// Default tile size in pixels used by the backend tile cache.
pub const DEFAULT_TILE_SIZE: u32 = 300;

/// Default display resolution used to relate scale denominators to pixels.
pub const DEFAULT_DPI: f64 = 96.0;

const METERS_PER_INCH: f64 = 0.0254;

/// Tiling configuration of one backend map.
#[derive(Debug, Clone)]
pub struct GridScheme {
    /// Full extent of the map in map units
    pub extent: MapBounds,
    /// Conversion from map units to meters
    pub meters_per_unit: f64,
    /// Tile width in pixels
    pub tile_width: u32,
    /// Tile height in pixels
    pub tile_height: u32,
    /// Display resolution in dots per inch
    pub dpi: f64,
    /// Scale denominators, indexed by scale level
    pub finite_scales: Vec<f64>,
    /// Base layer group names, in map order
    pub groups: Vec<String>,
}

impl GridScheme {
    /// A scheme with the backend's default tile size and DPI.
    pub fn new(
        extent: MapBounds,
        meters_per_unit: f64,
        finite_scales: Vec<f64>,
        groups: Vec<String>,
    ) -> Self {
        Self {
            extent,
            meters_per_unit,
            tile_width: DEFAULT_TILE_SIZE,
            tile_height: DEFAULT_TILE_SIZE,
            dpi: DEFAULT_DPI,
            finite_scales,
            groups,
        }
    }
}

/// Which part of a map a grid walk should cover.
#[derive(Debug, Clone, Default)]
pub struct GridWalkRequest {
    /// Bounds override in map units; `None` walks the full extent
    pub bounds: Option<MapBounds>,
    /// Group subset; empty walks every group the map defines
    pub groups: Vec<String>,
}

pub(super) fn plan(
    scheme: &GridScheme,
    request: &GridWalkRequest,
) -> Result<Vec<TileMatrix>, WalkError> {
    if !(scheme.meters_per_unit.is_finite() && scheme.meters_per_unit > 0.0) {
        return Err(WalkError::InvalidMetersPerUnit(scheme.meters_per_unit));
    }
    if scheme.finite_scales.is_empty() {
        return Err(WalkError::NoFiniteScales);
    }
    if scheme.finite_scales.len() > u8::MAX as usize + 1 {
        return Err(WalkError::TooManyScales(scheme.finite_scales.len()));
    }
    for (index, scale) in scheme.finite_scales.iter().enumerate() {
        if !(scale.is_finite() && *scale > 0.0) {
            return Err(WalkError::InvalidScale {
                index,
                value: *scale,
            });
        }
    }

    let groups = resolve_groups(scheme, request)?;

    let bounds = request.bounds.unwrap_or(scheme.extent);
    if bounds.is_inverted() || scheme.extent.is_inverted() {
        return Ok(Vec::new());
    }
    let walk_bounds = match bounds.intersect(&scheme.extent) {
        Some(bounds) => bounds,
        None => return Ok(Vec::new()),
    };

    let mut matrices = Vec::with_capacity(groups.len() * scheme.finite_scales.len());
    for group in &groups {
        for (index, scale) in scheme.finite_scales.iter().enumerate() {
            let units_per_pixel =
                scale * METERS_PER_INCH / (scheme.dpi * scheme.meters_per_unit);
            let span_x = scheme.tile_width as f64 * units_per_pixel;
            let span_y = scheme.tile_height as f64 * units_per_pixel;

            let total_cols = (scheme.extent.width() / span_x).ceil() as i64;
            let total_rows = (scheme.extent.height() / span_y).ceil() as i64;
            if total_cols <= 0 || total_rows <= 0 {
                continue;
            }

            let origin_x = scheme.extent.min_x;
            let origin_y = scheme.extent.max_y;

            let first_col = cell_index((walk_bounds.min_x - origin_x) / span_x, total_cols);
            let last_col = cell_index((walk_bounds.max_x - origin_x) / span_x, total_cols);
            let first_row = cell_index((origin_y - walk_bounds.max_y) / span_y, total_rows);
            let last_row = cell_index((origin_y - walk_bounds.min_y) / span_y, total_rows);

            matrices.push(TileMatrix {
                zoom: index as u8,
                group: Some(Arc::clone(group)),
                cols: first_col..last_col + 1,
                rows: first_row..last_row + 1,
            });
        }
    }

    Ok(matrices)
}

/// Resolves the requested group subset against the scheme, defaulting to
/// all of the map's groups when none were requested.
fn resolve_groups(
    scheme: &GridScheme,
    request: &GridWalkRequest,
) -> Result<Vec<Arc<str>>, WalkError> {
    if request.groups.is_empty() {
        return Ok(scheme.groups.iter().map(|g| Arc::from(g.as_str())).collect());
    }
    request
        .groups
        .iter()
        .map(|requested| {
            if scheme.groups.iter().any(|g| g == requested) {
                Ok(Arc::from(requested.as_str()))
            } else {
                Err(WalkError::UnknownGroup(requested.clone()))
            }
        })
        .collect()
}

#[inline]
fn cell_index(position: f64, total: i64) -> u32 {
    (position.floor() as i64).clamp(0, total - 1) as u32
}
