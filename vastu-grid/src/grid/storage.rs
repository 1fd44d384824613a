//! Row-major ternary occupancy grid.
//!
//! ```text
//!        x →
//!   y  ┌────────────┐
//!   ↓  │ row 0      │   index = y * width + x
//!      │ row 1      │
//!      │ ...        │
//!      └────────────┘
//! ```
//! Cells are stored as their persisted byte values, so `as_bytes()` is the
//! export format.

use crate::core::{CellState, GridCoord};
use serde::{Deserialize, Serialize};

/// Cell counts by state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellCounts {
    /// FREE cells.
    pub free: usize,
    /// OCCUPIED cells.
    pub occupied: usize,
    /// UNCERTAIN cells.
    pub uncertain: usize,
}

impl CellCounts {
    /// Observed cells.
    pub fn known(&self) -> usize {
        self.free + self.occupied
    }

    /// All cells.
    pub fn total(&self) -> usize {
        self.known() + self.uncertain
    }
}

/// Fixed-size grid of [`CellState`] bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OccupancyGrid {
    cells: Vec<u8>,
    width: usize,
    height: usize,
}

impl OccupancyGrid {
    /// Create a grid filled with UNCERTAIN.
    pub fn new(width: usize, height: usize) -> Self {
        Self::filled(width, height, CellState::Uncertain)
    }

    /// Create a grid filled with `state`.
    pub fn filled(width: usize, height: usize, state: CellState) -> Self {
        Self {
            cells: vec![state.as_u8(); width * height],
            width,
            height,
        }
    }

    /// Width in cells.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in cells.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Total cell count.
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Geometric center `(width / 2, height / 2)`.
    #[inline]
    pub fn center(&self) -> GridCoord {
        GridCoord::new((self.width / 2) as i32, (self.height / 2) as i32)
    }

    /// Check if grid coordinates are within bounds.
    #[inline]
    pub fn is_valid_coord(&self, coord: GridCoord) -> bool {
        coord.x >= 0
            && coord.y >= 0
            && (coord.x as usize) < self.width
            && (coord.y as usize) < self.height
    }

    /// Convert grid coordinates to flat array index.
    #[inline]
    pub fn coord_to_index(&self, coord: GridCoord) -> Option<usize> {
        if self.is_valid_coord(coord) {
            Some(coord.y as usize * self.width + coord.x as usize)
        } else {
            None
        }
    }

    /// Convert flat array index to grid coordinates.
    #[inline]
    pub fn index_to_coord(&self, index: usize) -> GridCoord {
        GridCoord::new((index % self.width) as i32, (index / self.width) as i32)
    }

    /// Cell state, or `None` outside the grid.
    #[inline]
    pub fn get(&self, coord: GridCoord) -> Option<CellState> {
        self.coord_to_index(coord)
            .map(|i| CellState::from_u8(self.cells[i]))
    }

    /// Cell state, UNCERTAIN outside the grid.
    #[inline]
    pub fn state(&self, coord: GridCoord) -> CellState {
        self.get(coord).unwrap_or(CellState::Uncertain)
    }

    /// Set a cell. Returns false (and writes nothing) outside the grid.
    #[inline]
    pub fn set(&mut self, coord: GridCoord, state: CellState) -> bool {
        match self.coord_to_index(coord) {
            Some(i) => {
                self.cells[i] = state.as_u8();
                true
            }
            None => false,
        }
    }

    /// Set a cell by flat index.
    #[inline]
    pub fn set_index(&mut self, index: usize, state: CellState) {
        self.cells[index] = state.as_u8();
    }

    /// Overwrite every cell.
    pub fn fill(&mut self, state: CellState) {
        self.cells.fill(state.as_u8());
    }

    /// Row-major cell bytes (FREE=0, UNCERTAIN=128, OCCUPIED=255).
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.cells
    }

    /// Consume the grid, returning its byte buffer.
    pub fn into_bytes(self) -> Vec<u8> {
        self.cells
    }

    /// Rows as byte slices, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.cells.chunks_exact(self.width.max(1))
    }

    /// Iterate over all cells with their coordinates.
    pub fn iter(&self) -> impl Iterator<Item = (GridCoord, CellState)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(|(i, &v)| (self.index_to_coord(i), CellState::from_u8(v)))
    }

    /// Count cells by state.
    pub fn count_by_state(&self) -> CellCounts {
        self.cells
            .iter()
            .fold(CellCounts::default(), |mut counts, &v| {
                match CellState::from_u8(v) {
                    CellState::Free => counts.free += 1,
                    CellState::Occupied => counts.occupied += 1,
                    CellState::Uncertain => counts.uncertain += 1,
                }
                counts
            })
    }

    /// Copy of this grid in a larger canvas.
    ///
    /// Cell (x, y) lands at (x + offset_x, y + offset_y); the rest of the
    /// new grid is UNCERTAIN. The whole old grid must fit.
    pub fn expanded(
        &self,
        new_width: usize,
        new_height: usize,
        offset_x: usize,
        offset_y: usize,
    ) -> Self {
        assert!(
            offset_x + self.width <= new_width && offset_y + self.height <= new_height,
            "{}x{} grid at +({}, {}) does not fit in {}x{}",
            self.width,
            self.height,
            offset_x,
            offset_y,
            new_width,
            new_height
        );

        let mut expanded = Self::new(new_width, new_height);
        for (y, row) in self.rows().enumerate().take(self.height) {
            let start = (y + offset_y) * new_width + offset_x;
            expanded.cells[start..start + self.width].copy_from_slice(row);
        }
        expanded
    }
}
