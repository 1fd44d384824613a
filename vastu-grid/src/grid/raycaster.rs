//! Bresenham line rasterization.
//!
//! Integer-only line drawing between two grid cells, used to trace the
//! boundary polygon of a submap:
//!
//! ```text
//! From (0,0) to (7,3):
//!
//!     3 │             ●●
//!     2 │         ●●
//!     1 │     ●●
//!     0 ●●
//!       └──────────────────
//!        0 1 2 3 4 5 6 7
//! ```
//!
//! Lines are always rasterized from the endpoint with the smaller major-axis
//! coordinate and yielded in the requested direction, so `(a, b)` and `(b, a)`
//! cover the same cells in opposite order.

use crate::core::GridCoord;

/// Bresenham's line algorithm iterator.
///
/// Yields every cell from `start` to `end`, both inclusive. Rasterizing
/// from the lower endpoint keeps the cell set independent of direction.
#[derive(Clone, Debug)]
pub struct BresenhamLine {
    /// Lower endpoint, in (major, minor) axis order.
    origin: GridCoord,
    /// Major-axis length.
    dx: i32,
    /// Minor-axis length (absolute).
    dy: i32,
    /// Minor-axis direction (+1 or -1).
    y_step: i32,
    steep: bool,
    reversed: bool,
    /// Remaining major-axis steps, inclusive range.
    front: i32,
    back: i32,
}

impl BresenhamLine {
    /// Create a new Bresenham line iterator from start to end coordinates.
    pub fn new(start: GridCoord, end: GridCoord) -> Self {
        let steep = (end.y - start.y).abs() > (end.x - start.x).abs();
        let (a, b) = if steep {
            (GridCoord::new(start.y, start.x), GridCoord::new(end.y, end.x))
        } else {
            (start, end)
        };
        let reversed = a.x > b.x;
        let (a, b) = if reversed { (b, a) } else { (a, b) };

        let dx = b.x - a.x;
        Self {
            origin: a,
            dx,
            dy: (b.y - a.y).abs(),
            y_step: if a.y < b.y { 1 } else { -1 },
            steep,
            reversed,
            front: 0,
            back: dx,
        }
    }

    /// Cell at major-axis step `k` of the lower-endpoint rasterization.
    ///
    /// The running error starts at `dx / 2` and loses `dy` per step, gaining
    /// `dx` on each minor-axis step, so after `k` steps the minor axis has
    /// advanced by `ceil((k * dy - dx / 2) / dx)` clamped at zero.
    fn cell(&self, k: i32) -> GridCoord {
        let minor = if self.dx == 0 {
            0
        } else {
            (k * self.dy + self.dx - 1 - self.dx / 2) / self.dx
        };
        let x = self.origin.x + k;
        let y = self.origin.y + self.y_step * minor;
        if self.steep {
            GridCoord::new(y, x)
        } else {
            GridCoord::new(x, y)
        }
    }
}

impl Iterator for BresenhamLine {
    type Item = GridCoord;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front > self.back {
            return None;
        }
        let k = if self.reversed {
            let k = self.back;
            self.back -= 1;
            k
        } else {
            let k = self.front;
            self.front += 1;
            k
        };
        Some(self.cell(k))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.back - self.front + 1).max(0) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for BresenhamLine {}

/// Collect the cells of the segment from `start` to `end`.
pub fn line_cells(start: GridCoord, end: GridCoord) -> Vec<GridCoord> {
    BresenhamLine::new(start, end).collect()
}
