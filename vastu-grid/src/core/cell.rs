//! Ternary cell state.

use serde::{Deserialize, Serialize};

/// Occupancy state of one grid cell.
///
/// The discriminants are the persisted byte values, so a grid buffer can be
/// written out as a grayscale image without conversion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum CellState {
    /// Observed empty space.
    Free = 0,
    /// No information yet.
    #[default]
    Uncertain = 128,
    /// Observed obstacle.
    Occupied = 255,
}

impl CellState {
    /// Decode a stored byte. Anything other than 0 or 255 reads as uncertain.
    #[inline]
    pub const fn from_u8(value: u8) -> Self {
        match value {
            0 => CellState::Free,
            255 => CellState::Occupied,
            _ => CellState::Uncertain,
        }
    }

    /// Stored byte value.
    #[inline]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// True for FREE and OCCUPIED, the only states a submap may write.
    #[inline]
    pub const fn is_known(self) -> bool {
        !matches!(self, CellState::Uncertain)
    }
}

impl From<CellState> for u8 {
    fn from(state: CellState) -> u8 {
        state as u8
    }
}
