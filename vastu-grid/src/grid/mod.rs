//! Grid storage and line rasterization.

pub mod raycaster;
mod storage;

pub use raycaster::{BresenhamLine, line_cells};
pub use storage::{CellCounts, OccupancyGrid};
