//! XYZ (slippy map) walk planning.
//!
//! For each zoom level the covering tile rectangle is derived from the
//! bounding box with the standard slippy-map formula, clamped to the valid
//! index range at that zoom.

use super::{MapBounds, TileMatrix};
use crate::coord::{col_for_lon, row_for_lat};
use std::ops::RangeInclusive;

pub(super) fn plan(bounds: &MapBounds, zoom_levels: RangeInclusive<u8>) -> Vec<TileMatrix> {
    if bounds.is_inverted() {
        return Vec::new();
    }

    zoom_levels
        .map(|zoom| {
            let first_col = col_for_lon(bounds.min_x, zoom);
            let last_col = col_for_lon(bounds.max_x, zoom);
            // Row 0 is the northern edge, so the box's max latitude gives
            // the first row.
            let first_row = row_for_lat(bounds.max_y, zoom);
            let last_row = row_for_lat(bounds.min_y, zoom);

            TileMatrix {
                zoom,
                group: None,
                cols: first_col..last_col + 1,
                rows: first_row..last_row + 1,
            }
        })
        .collect()
}
