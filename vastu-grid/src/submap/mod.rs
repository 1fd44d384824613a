//! Local submaps built from a single revolution.
//!
//! A submap is a small grid whose geometric center `(width / 2, height / 2)`
//! is the sensor position at capture time. It lives for one fusion step.

mod builder;

pub use builder::{Submapper, flood_fill};

use crate::core::{CellState, GridCoord};
use crate::grid::{CellCounts, OccupancyGrid};

/// Sensor-centered local grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Submap {
    grid: OccupancyGrid,
}

impl Submap {
    /// All-UNCERTAIN submap.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            grid: OccupancyGrid::new(width, height),
        }
    }

    /// Wrap an existing grid; its center is taken as the sensor position.
    pub fn from_grid(grid: OccupancyGrid) -> Self {
        Self { grid }
    }

    /// Smallest even-sized submap centered on the origin that holds
    /// `points` with a one-cell margin on every side.
    ///
    /// A scan that only sees one side can be up to twice as wide as its tight box.
    pub(crate) fn enclosing(points: &[GridCoord]) -> Self {
        let (half_x, half_y) = points.iter().fold((0u32, 0u32), |(hx, hy), p| {
            (hx.max(p.x.unsigned_abs()), hy.max(p.y.unsigned_abs()))
        });
        Self::new(
            2 * (half_x as usize + 1),
            2 * (half_y as usize + 1),
        )
    }

    /// Width in cells.
    pub fn width(&self) -> usize {
        self.grid.width()
    }

    /// Height in cells.
    pub fn height(&self) -> usize {
        self.grid.height()
    }

    /// Sensor cell.
    pub fn center(&self) -> GridCoord {
        self.grid.center()
    }

    /// Cell state, or `None` outside the submap.
    pub fn get(&self, coord: GridCoord) -> Option<CellState> {
        self.grid.get(coord)
    }

    /// Set a cell. Returns false outside the submap.
    pub fn set(&mut self, coord: GridCoord, state: CellState) -> bool {
        self.grid.set(coord, state)
    }

    /// Clamp a coordinate into the submap.
    pub fn clamp(&self, coord: GridCoord) -> GridCoord {
        GridCoord::new(
            coord.x.clamp(0, self.width().saturating_sub(1) as i32),
            coord.y.clamp(0, self.height().saturating_sub(1) as i32),
        )
    }

    /// Underlying grid.
    pub fn grid(&self) -> &OccupancyGrid {
        &self.grid
    }

    /// Underlying grid, mutably.
    pub fn grid_mut(&mut self) -> &mut OccupancyGrid {
        &mut self.grid
    }

    /// Consume into the underlying grid.
    pub fn into_grid(self) -> OccupancyGrid {
        self.grid
    }

    /// FREE and OCCUPIED cells with their local coordinates.
    pub fn known_cells(&self) -> impl Iterator<Item = (GridCoord, CellState)> + '_ {
        self.grid.iter().filter(|(_, state)| state.is_known())
    }

    /// Count cells by state.
    pub fn count_by_state(&self) -> CellCounts {
        self.grid.count_by_state()
    }
}
