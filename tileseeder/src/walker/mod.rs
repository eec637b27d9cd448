//! Tile walk planning and enumeration.
//!
//! A [`TileWalk`] is the finite, restartable sequence of tile addresses a
//! seeding run will render. Both tiling schemes compile down to the same
//! representation: a short list of per-level column/row ranges, computed
//! once up front by range arithmetic. The total tile count
//! is therefore a pure sum of range products, and enumeration is a lazy
//! row-major scan over the ranges, so the hot loop carries no per-scheme
//! dispatch at all.

mod grid;
mod xyz;

pub use grid::{GridScheme, GridWalkRequest, DEFAULT_DPI, DEFAULT_TILE_SIZE};

use crate::coord::TileAddress;
use std::ops::{Range, RangeInclusive};
use std::sync::Arc;
use thiserror::Error;

/// An axis-aligned bounding box, in longitude/latitude degrees for the XYZ
/// scheme or map units for the grid scheme.
///
/// No normalization is applied: a box whose min exceeds its max on either
/// axis is treated as covering nothing, and a box whose min equals its max
/// is a point (covered by exactly the cell containing it).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapBounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl MapBounds {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// True when the box covers nothing on at least one axis.
    pub fn is_inverted(&self) -> bool {
        self.min_x > self.max_x || self.min_y > self.max_y
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Intersection with another box, or `None` when they do not overlap.
    ///
    /// Boxes that merely touch along an edge still intersect (in a
    /// zero-area box), matching the walker's point-coverage rule.
    pub fn intersect(&self, other: &MapBounds) -> Option<MapBounds> {
        let out = MapBounds {
            min_x: self.min_x.max(other.min_x),
            min_y: self.min_y.max(other.min_y),
            max_x: self.max_x.min(other.max_x),
            max_y: self.max_y.min(other.max_y),
        };
        if out.is_inverted() {
            None
        } else {
            Some(out)
        }
    }
}

/// Errors preventing a walk from being planned at all.
///
/// These are fatal: they surface before any tile is attempted. Degenerate
/// requests (empty or inverted boxes, extents with no overlap) are not
/// errors; they plan an empty walk.
#[derive(Debug, Error)]
pub enum WalkError {
    /// The map defines no finite display scales to tile against
    #[error("map defines no finite display scales")]
    NoFiniteScales,

    /// Meters-per-unit was missing or non-positive
    #[error("meters-per-unit must be positive, got {0}")]
    InvalidMetersPerUnit(f64),

    /// A requested layer group does not exist on the map
    #[error("layer group '{0}' is not defined by the map")]
    UnknownGroup(String),

    /// A finite display scale was non-positive or not a number
    #[error("finite scale #{index} is not a usable scale denominator ({value})")]
    InvalidScale { index: usize, value: f64 },

    /// More finite scales than a tile address can index
    #[error("map defines {0} finite scales, exceeding the addressable range")]
    TooManyScales(usize),
}

/// Column/row ranges for one zoom level (and, for grid walks, one group).
#[derive(Debug, Clone)]
struct TileMatrix {
    zoom: u8,
    group: Option<Arc<str>>,
    cols: Range<u32>,
    rows: Range<u32>,
}

impl TileMatrix {
    fn count(&self) -> u64 {
        self.cols.len() as u64 * self.rows.len() as u64
    }
}

/// The planned tile sequence for one seeding run.
#[derive(Debug, Clone)]
pub struct TileWalk {
    matrices: Vec<TileMatrix>,
}

impl TileWalk {
    /// Plans an XYZ walk over a lon/lat box for an inclusive zoom range.
    ///
    /// Never fails: coordinates outside the valid range are clamped and a
    /// box covering nothing yields an empty walk.
    pub fn xyz(bounds: MapBounds, zoom_levels: RangeInclusive<u8>) -> TileWalk {
        TileWalk {
            matrices: xyz::plan(&bounds, zoom_levels),
        }
    }

    /// Plans a map-unit grid walk for the requested groups and bounds.
    ///
    /// Fails only when the scheme itself is unusable (no scales, bad
    /// meters-per-unit, unknown group); see [`WalkError`].
    pub fn grid(scheme: &GridScheme, request: &GridWalkRequest) -> Result<TileWalk, WalkError> {
        Ok(TileWalk {
            matrices: grid::plan(scheme, request)?,
        })
    }

    /// Total number of tiles the walk will yield.
    ///
    /// Computed by the same range arithmetic that drives enumeration, so it
    /// always agrees with the iterator without paying enumeration cost.
    pub fn count(&self) -> u64 {
        self.matrices.iter().map(TileMatrix::count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// A fresh iterator over the walk; may be called any number of times.
    pub fn iter(&self) -> TileWalkIter<'_> {
        TileWalkIter {
            matrices: &self.matrices,
            level: 0,
            col: 0,
            row: 0,
        }
    }
}

impl<'a> IntoIterator for &'a TileWalk {
    type Item = TileAddress;
    type IntoIter = TileWalkIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Lazy row-major iterator over a [`TileWalk`].
///
/// Yields every level's tiles row by row, ascending zoom/scale within each
/// group, groups in scheme order.
#[derive(Debug, Clone)]
pub struct TileWalkIter<'a> {
    matrices: &'a [TileMatrix],
    level: usize,
    col: u32,
    row: u32,
}

impl Iterator for TileWalkIter<'_> {
    type Item = TileAddress;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let matrix = self.matrices.get(self.level)?;

            if matrix.cols.is_empty() || matrix.rows.is_empty() {
                self.advance_level();
                continue;
            }

            let col = matrix.cols.start + self.col;
            let row = matrix.rows.start + self.row;

            // Advance row-major: columns fastest
            self.col += 1;
            if self.col as usize >= matrix.cols.len() {
                self.col = 0;
                self.row += 1;
                if self.row as usize >= matrix.rows.len() {
                    self.advance_level();
                }
            }

            return Some(TileAddress {
                zoom: matrix.zoom,
                col,
                row,
                group: matrix.group.clone(),
            });
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let mut remaining: u64 = 0;
        if let Some(matrix) = self.matrices.get(self.level) {
            let done = self.row as u64 * matrix.cols.len() as u64 + self.col as u64;
            remaining += matrix.count() - done;
        }
        for matrix in self.matrices.iter().skip(self.level + 1) {
            remaining += matrix.count();
        }
        let remaining = usize::try_from(remaining).unwrap_or(usize::MAX);
        (remaining, Some(remaining))
    }
}

impl TileWalkIter<'_> {
    fn advance_level(&mut self) {
        self.level += 1;
        self.col = 0;
        self.row = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intersect_overlapping() {
        let a = MapBounds::new(0.0, 0.0, 10.0, 10.0);
        let b = MapBounds::new(5.0, 5.0, 20.0, 20.0);
        let out = a.intersect(&b).unwrap();
        assert_eq!(out, MapBounds::new(5.0, 5.0, 10.0, 10.0));
    }

    #[test]
    fn test_intersect_disjoint_is_none() {
        let a = MapBounds::new(0.0, 0.0, 1.0, 1.0);
        let b = MapBounds::new(2.0, 2.0, 3.0, 3.0);
        assert!(a.intersect(&b).is_none());
    }

    #[test]
    fn test_intersect_touching_edge_is_point_or_line() {
        let a = MapBounds::new(0.0, 0.0, 1.0, 1.0);
        let b = MapBounds::new(1.0, 0.0, 2.0, 1.0);
        let out = a.intersect(&b).unwrap();
        assert_eq!(out.width(), 0.0);
    }

    #[test]
    fn test_iterator_is_row_major() {
        let walk = TileWalk {
            matrices: vec![TileMatrix {
                zoom: 1,
                group: None,
                cols: 2..4,
                rows: 5..7,
            }],
        };
        let tiles: Vec<(u32, u32)> = walk.iter().map(|t| (t.col, t.row)).collect();
        assert_eq!(tiles, vec![(2, 5), (3, 5), (2, 6), (3, 6)]);
    }

    #[test]
    fn test_iterator_skips_empty_matrices() {
        let walk = TileWalk {
            matrices: vec![
                TileMatrix {
                    zoom: 0,
                    group: None,
                    cols: 0..0,
                    rows: 0..1,
                },
                TileMatrix {
                    zoom: 1,
                    group: None,
                    cols: 0..1,
                    rows: 0..1,
                },
            ],
        };
        assert_eq!(walk.count(), 1);
        assert_eq!(walk.iter().count(), 1);
    }

    #[test]
    fn test_iterator_restarts_fresh() {
        let walk = TileWalk {
            matrices: vec![TileMatrix {
                zoom: 0,
                group: None,
                cols: 0..3,
                rows: 0..3,
            }],
        };
        assert_eq!(walk.iter().count(), 9);
        assert_eq!(walk.iter().count(), 9);
    }

    #[test]
    fn test_size_hint_tracks_progress() {
        let walk = TileWalk {
            matrices: vec![TileMatrix {
                zoom: 0,
                group: None,
                cols: 0..2,
                rows: 0..2,
            }],
        };
        let mut iter = walk.iter();
        assert_eq!(iter.size_hint(), (4, Some(4)));
        iter.next();
        assert_eq!(iter.size_hint(), (3, Some(3)));
    }
}
