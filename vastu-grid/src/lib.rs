//! # VastuGrid
//!
//! Ternary occupancy grid mapping from 2D lidar revolutions.
//!
//! ## Overview
//!
//! Each revolution from the sensor becomes a **submap**: a small grid centered
//! on the sensor, with the scan outline traced as free space, the enclosed
//! area flood-filled free and every return stamped as an obstacle. Submaps
//! are overlaid onto a **global grid** that grows on demand and never forgets
//! cells the current revolution cannot see.
//!
//! Cells take one of three values:
//!
//! - **Free** (0) - observed empty space
//! - **Uncertain** (128) - not yet observed
//! - **Occupied** (255) - observed obstacle
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use drishti_io::{G2Driver, LidarConfig};
//! use std::time::Duration;
//! use vastu_grid::{FusionWorker, GridCoord, MapperConfig};
//!
//! let mut lidar = G2Driver::open(LidarConfig::default())?;
//! let fusion = FusionWorker::from_config(&MapperConfig::default())?.spawn()?;
//!
//! lidar.enable()?;
//! for _ in 0..10 {
//!     fusion.submit_cycle(lidar.read_cycle(Duration::from_secs(1))?)?;
//! }
//! fusion.update_observer_pos(GridCoord::new(12, -3))?;
//!
//! let map = fusion.snapshot(Duration::from_secs(1))?;
//! println!("{}x{} grid", map.grid.width(), map.grid.height());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Coordinate System
//!
//! Grid cells are addressed `(x, y)` with x to the right and y down, (0, 0)
//! at the top-left, stored row-major. The observer position is a signed cell
//! offset from the map's logical center.

#![warn(missing_docs)]

// Cell states and coordinates
pub mod core;

// Grid storage and line rasterization
pub mod grid;

// Configuration and errors
pub mod config;
pub mod error;

// Revolution -> submap
pub mod submap;

// Submap -> global grid
pub mod mapper;

// Single-writer fusion thread
pub mod fusion;

pub use config::{ConfigError, MapperConfig};
pub use crate::core::{CellState, GridCoord};
pub use error::{Error, Result};
pub use fusion::{FusionHandle, FusionMessage, FusionStats, FusionWorker, MapSnapshot};
pub use grid::{BresenhamLine, CellCounts, OccupancyGrid, line_cells};
pub use mapper::{BoundingBox, GlobalMapper, UpdateResult};
pub use submap::{Submap, Submapper, flood_fill};
