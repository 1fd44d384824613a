//! Growable global grid fed by submaps.
//!
//! The mapper keeps a logical center, the cell the observer position is
//! measured from. It starts at the grid center and moves with the content
//! whenever the grid grows, so absolute positions never change meaning:
//!
//! ```text
//!  before resize            after growing left by 3
//!  ┌────────┐               ┌───┬────────┐
//!  │   c    │               │   │   c    │   c' = c + (3, 0)
//!  └────────┘               └───┴────────┘
//! ```
//!
//! The center is stored in half cells so odd grid sizes place it exactly;
//! the integer anchor used for drawing is the floor of half of it.

use crate::config::{ConfigError, MapperConfig};
use crate::core::{CellState, GridCoord};
use crate::grid::OccupancyGrid;
use crate::submap::Submap;
use serde::{Deserialize, Serialize};

/// Axis-aligned extent in global grid cells, max exclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge.
    pub min_x: i64,
    /// Right edge (exclusive).
    pub max_x: i64,
    /// Top edge.
    pub min_y: i64,
    /// Bottom edge (exclusive).
    pub max_y: i64,
}

impl BoundingBox {
    /// Width in cells.
    pub fn width(&self) -> i64 {
        self.max_x - self.min_x
    }

    /// Height in cells.
    pub fn height(&self) -> i64 {
        self.max_y - self.min_y
    }

    /// `(min_x, max_x, min_y, max_y)`.
    pub fn as_tuple(&self) -> (i64, i64, i64, i64) {
        (self.min_x, self.max_x, self.min_y, self.max_y)
    }
}

/// Outcome of one [`GlobalMapper::update`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UpdateResult {
    /// The grid grew before drawing.
    pub resized: bool,
    /// Cells copied from the submap.
    pub cells_written: usize,
    /// Of which FREE.
    pub cells_free: usize,
    /// Of which OCCUPIED.
    pub cells_occupied: usize,
}

/// Owner of the persistent occupancy grid.
#[derive(Clone, Debug)]
pub struct GlobalMapper {
    grid: OccupancyGrid,
    /// Logical center in half cells.
    center_half: (i64, i64),
    observer: GridCoord,
    resize_count: u64,
}

impl GlobalMapper {
    /// Create an all-UNCERTAIN `width` × `height` grid with the observer at its center.
    pub fn new(width: usize, height: usize) -> Result<Self, ConfigError> {
        if width == 0 || height == 0 {
            return Err(ConfigError::InvalidDimensions { width, height });
        }
        Ok(Self {
            grid: OccupancyGrid::new(width, height),
            center_half: (width as i64, height as i64),
            observer: GridCoord::ZERO,
            resize_count: 0,
        })
    }

    /// Create from a mapper configuration.
    pub fn from_config(config: &MapperConfig) -> Result<Self, ConfigError> {
        Self::new(config.initial_width, config.initial_height)
    }

    /// The global grid.
    pub fn grid(&self) -> &OccupancyGrid {
        &self.grid
    }

    /// Consume into the global grid.
    pub fn into_grid(self) -> OccupancyGrid {
        self.grid
    }

    /// Current observer offset from the logical center.
    pub fn observer_pos(&self) -> GridCoord {
        self.observer
    }

    /// Replace the observer position. Takes effect on the next update.
    pub fn update_observer_pos(&mut self, position: GridCoord) {
        self.observer = position;
    }

    /// Integer cell of the logical center.
    pub fn anchor(&self) -> GridCoord {
        GridCoord::new(
            self.center_half.0.div_euclid(2) as i32,
            self.center_half.1.div_euclid(2) as i32,
        )
    }

    /// Cell where the submap center lands.
    pub fn drawing_point(&self) -> GridCoord {
        self.anchor() + self.observer
    }

    /// Number of resizes so far.
    pub fn resize_count(&self) -> u64 {
        self.resize_count
    }

    /// Extent the grid must cover to draw `submap` at the current position.
    ///
    /// The submap box is computed around the doubled drawing point and
    /// truncated toward zero, then unioned with the current grid.
    pub fn resized_bbox(&self, submap: &Submap) -> BoundingBox {
        let drawing_x = self.center_half.0 + 2 * i64::from(self.observer.x);
        let drawing_y = self.center_half.1 + 2 * i64::from(self.observer.y);
        let w = submap.width() as i64;
        let h = submap.height() as i64;

        BoundingBox {
            min_x: ((drawing_x - w - 1) / 2).min(0),
            max_x: ((drawing_x + w + 1) / 2).max(self.grid.width() as i64),
            min_y: ((drawing_y - h - 1) / 2).min(0),
            max_y: ((drawing_y + h + 1) / 2).max(self.grid.height() as i64),
        }
    }

    /// Fuse a submap drawn at the current observer position.
    ///
    /// Grows the grid first when needed. Only FREE and OCCUPIED cells are
    /// copied; UNCERTAIN submap cells never erase what the grid knows.
    ///
    /// # Panics
    ///
    /// If a submap cell lands outside the grid after resizing, which would
    /// mean the bounding box computation is wrong.
    pub fn update(&mut self, submap: &Submap) -> UpdateResult {
        let bbox = self.resized_bbox(submap);
        let resized = self.resize_to(bbox);

        let drawing = self.drawing_point();
        let local_center = submap.center();
        let mut result = UpdateResult {
            resized,
            ..UpdateResult::default()
        };

        for (local, state) in submap.known_cells() {
            let target = drawing + (local - local_center);
            let Some(index) = self.grid.coord_to_index(target) else {
                panic!(
                    "submap cell {:?} maps to {:?}, outside the {}x{} grid",
                    local,
                    target,
                    self.grid.width(),
                    self.grid.height()
                );
            };
            self.grid.set_index(index, state);
            result.cells_written += 1;
            if state == CellState::Free {
                result.cells_free += 1;
            } else {
                result.cells_occupied += 1;
            }
        }

        log::trace!(
            "Fused {}x{} submap at {:?}: {} cells",
            submap.width(),
            submap.height(),
            drawing,
            result.cells_written
        );
        result
    }

    /// Grow to `bbox` if it exceeds the grid. Returns true if it did.
    fn resize_to(&mut self, bbox: BoundingBox) -> bool {
        let (width, height) = (self.grid.width() as i64, self.grid.height() as i64);
        if bbox.min_x >= 0 && bbox.min_y >= 0 && bbox.max_x <= width && bbox.max_y <= height {
            return false;
        }

        let shift_x = -bbox.min_x;
        let shift_y = -bbox.min_y;
        self.grid = self.grid.expanded(
            bbox.width() as usize,
            bbox.height() as usize,
            shift_x as usize,
            shift_y as usize,
        );
        self.center_half.0 += 2 * shift_x;
        self.center_half.1 += 2 * shift_y;
        self.resize_count += 1;

        log::info!(
            "Global grid resized {}x{} -> {}x{} (content shifted by {}, {})",
            width,
            height,
            self.grid.width(),
            self.grid.height(),
            shift_x,
            shift_y
        );
        true
    }
}
