//! Core value types: cell states and grid coordinates.

mod cell;
mod point;

pub use cell::CellState;
pub use point::GridCoord;
