//! Planar position → grid cell mapping.
//!
//! Node positions and the flood grid come from different collaborators; this
//! mapping ties them together.  Out-of-extent positions clamp to the nearest
//! valid cell — sampling never fails (the grid covers the region of interest,
//! and a node a few metres past the raster edge should read the edge cell,
//! not crash the run).

use fr_core::{BoundingBox, Point2};
use fr_grid::FloodGrid;

/// Affine fit of a planar bounding box onto a `rows x cols` cell lattice.
///
/// The fit is the normalized form the data pipeline uses when it writes the
/// graph: `col = (x - min.x) / width * (cols - 1)`, truncated, and likewise
/// for rows — so cell (0,0) is the box's min corner.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridMapping {
    bounds: BoundingBox,
    rows: usize,
    cols: usize,
}

impl GridMapping {
    /// Map `bounds` onto a `rows x cols` lattice.
    pub fn new(bounds: BoundingBox, rows: usize, cols: usize) -> Self {
        Self { bounds, rows, cols }
    }

    /// Map `bounds` onto `grid`'s lattice.
    pub fn for_grid(bounds: BoundingBox, grid: &FloodGrid) -> Self {
        Self::new(bounds, grid.rows(), grid.cols())
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// The `(row, col)` cell containing `pos`, clamped to the grid extent.
    pub fn cell_of(&self, pos: Point2) -> (usize, usize) {
        (
            self.axis_cell(pos.y, self.bounds.min.y, self.bounds.height(), self.rows),
            self.axis_cell(pos.x, self.bounds.min.x, self.bounds.width(), self.cols),
        )
    }

    /// One axis of the normalized fit: fraction of the extent, scaled to the
    /// last valid index, truncated, clamped.
    fn axis_cell(&self, v: f64, min: f64, extent: f64, n: usize) -> usize {
        if n <= 1 || extent <= 0.0 {
            return 0;
        }
        let frac = ((v - min) / extent).clamp(0.0, 1.0);
        let cell = (frac * (n - 1) as f64) as usize;
        cell.min(n - 1)
    }
}
