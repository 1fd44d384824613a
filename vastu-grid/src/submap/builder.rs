//! Revolution → submap.
//!
//! ```text
//! samples ──rasterize──▶ points ──size──▶ UNCERTAIN canvas
//!                                           │
//!        walls ◀── flood fill ◀── outline ◀─┘ (shift by center)
//! ```
//! The outline joins consecutive points with FREE lines, the flood fill
//! spreads FREE from the sensor cell up to that outline, and every point is
//! finally stamped OCCUPIED as a 2×2 block.

use super::Submap;
use crate::config::{ConfigError, MapperConfig};
use crate::core::{CellState, GridCoord};
use crate::grid::{BresenhamLine, OccupancyGrid};
use drishti_io::{Cycle, ScanSample};

/// Right, bottom and bottom-right neighbors plus the point itself.
const WALL_STAMP: [(i32, i32); 4] = [(0, 0), (1, 0), (0, 1), (1, 1)];

/// Builds submaps at a fixed resolution.
#[derive(Clone, Debug)]
pub struct Submapper {
    resolution: i32,
}

impl Submapper {
    /// Create a submapper; `resolution` is millimeters per cell, at least 1.
    pub fn new(resolution: i32) -> Result<Self, ConfigError> {
        if resolution < 1 {
            return Err(ConfigError::InvalidResolution(resolution));
        }
        Ok(Self { resolution })
    }

    /// Create from a mapper configuration.
    pub fn from_config(config: &MapperConfig) -> Result<Self, ConfigError> {
        Self::new(config.resolution_mm)
    }

    /// Millimeters per cell.
    pub fn resolution(&self) -> i32 {
        self.resolution
    }

    /// Build the submap for one revolution.
    pub fn build(&self, cycle: &Cycle) -> Submap {
        let submap = self.build_from_samples(&cycle.samples);
        log::trace!(
            "Submap for cycle #{}: {}x{} from {} samples",
            cycle.sequence,
            submap.width(),
            submap.height(),
            cycle.len()
        );
        submap
    }

    /// Build a submap from samples in arrival order.
    pub fn build_from_samples(&self, samples: &[ScanSample]) -> Submap {
        let points = self.rasterize(samples);
        let mut submap = Submap::enclosing(&points);
        if points.is_empty() {
            return submap;
        }

        let center = submap.center();
        let adjusted: Vec<GridCoord> = points.iter().map(|&p| submap.clamp(p + center)).collect();

        trace_outline(&mut submap, &adjusted);
        flood_fill(submap.grid_mut(), center);
        for &point in &adjusted {
            for (dx, dy) in WALL_STAMP {
                submap.set(point.offset(dx, dy), CellState::Occupied);
            }
        }
        submap
    }

    /// Sensor-relative cell of every sample that has a return.
    ///
    /// Coordinates truncate toward zero, so the cells around the sensor
    /// cover slightly more than one resolution step.
    pub fn rasterize(&self, samples: &[ScanSample]) -> Vec<GridCoord> {
        let resolution = f64::from(self.resolution);
        samples
            .iter()
            .filter(|s| !s.is_no_return())
            .map(|s| {
                let (x, y) = s.to_cartesian();
                GridCoord::new(
                    (x / resolution).trunc() as i32,
                    (y / resolution).trunc() as i32,
                )
            })
            .collect()
    }
}

/// Join consecutive points with FREE lines.
///
/// Points on the sensor cell are skipped. The polygon is closed from the
/// last kept point to the first point, even when that first point is the
/// sensor cell.
fn trace_outline(submap: &mut Submap, adjusted: &[GridCoord]) {
    let center = submap.center();
    let mut previous: Option<GridCoord> = None;

    for &point in adjusted.iter().filter(|&&p| p != center) {
        if let Some(from) = previous {
            draw_free(submap, from, point);
        }
        previous = Some(point);
    }

    if let (Some(last), Some(&first)) = (previous, adjusted.first()) {
        draw_free(submap, last, first);
    }
}

fn draw_free(submap: &mut Submap, from: GridCoord, to: GridCoord) {
    for cell in BresenhamLine::new(from, to) {
        submap.set(cell, CellState::Free);
    }
}

/// 4-connected fill from `seed`, turning UNCERTAIN cells FREE.
///
/// FREE and OCCUPIED cells both stop the fill. The seed itself is expanded
/// whatever its state. Returns the number of cells filled.
pub fn flood_fill(grid: &mut OccupancyGrid, seed: GridCoord) -> usize {
    if !grid.is_valid_coord(seed) {
        return 0;
    }

    let mut filled = 0;
    if grid.state(seed) == CellState::Uncertain {
        grid.set(seed, CellState::Free);
        filled += 1;
    }

    let mut stack = vec![seed];
    while let Some(cell) = stack.pop() {
        for next in cell.neighbors4() {
            if grid.get(next) == Some(CellState::Uncertain) {
                grid.set(next, CellState::Free);
                filled += 1;
                stack.push(next);
            }
        }
    }
    filled
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI, TAU};

    fn sample(angle: f64, distance: u16) -> ScanSample {
        ScanSample::new(angle, distance, 0)
    }

    /// Ring of samples at a constant range.
    fn ring(count: usize, distance: u16) -> Vec<ScanSample> {
        (0..count)
            .map(|i| sample(TAU * i as f64 / count as f64, distance))
            .collect()
    }

    #[test]
    fn test_invalid_resolution() {
        assert_eq!(
            Submapper::new(0).unwrap_err(),
            ConfigError::InvalidResolution(0)
        );
        assert!(Submapper::new(-5).is_err());
        assert!(Submapper::new(1).is_ok());
    }

    #[test]
    fn test_rasterize() {
        let submapper = Submapper::new(100).unwrap();
        let points = submapper.rasterize(&[sample(0.0, 1000), sample(FRAC_PI_2, 1000)]);
        assert_eq!(points, vec![GridCoord::new(10, 0), GridCoord::new(0, 10)]);
    }

    #[test]
    fn test_rasterize_truncates_toward_zero() {
        let submapper = Submapper::new(100).unwrap();
        let points = submapper.rasterize(&[sample(PI, 1050), sample(0.0, 0), sample(0.0, 99)]);
        assert_eq!(points, vec![GridCoord::new(-10, 0), GridCoord::new(0, 0)]);
    }

    #[test]
    fn test_empty_cycle() {
        let submapper = Submapper::new(18).unwrap();
        let submap = submapper.build_from_samples(&[sample(1.0, 0), sample(2.0, 0)]);
        assert_eq!((submap.width(), submap.height()), (2, 2));
        assert_eq!(submap.count_by_state().uncertain, 4);
    }

    #[test]
    fn test_dimensions_even_and_centered() {
        let submapper = Submapper::new(100).unwrap();
        let submap = submapper.build_from_samples(&[
            sample(0.0, 1000),
            sample(FRAC_PI_2, 500),
            sample(PI, 300),
        ]);
        assert_eq!(submap.width(), 22);
        assert_eq!(submap.height(), 12);
        assert_eq!(submap.center(), GridCoord::new(11, 6));
    }

    #[test]
    fn test_ring_is_filled_and_walled() {
        let submapper = Submapper::new(100).unwrap();
        let submap = submapper.build_from_samples(&ring(360, 1000));
        let center = submap.center();

        assert_eq!(submap.get(center), Some(CellState::Free));
        assert_eq!(submap.get(center.offset(5, 5)), Some(CellState::Free));
        assert_eq!(submap.get(center.offset(10, 0)), Some(CellState::Occupied));
        assert_eq!(submap.get(center.offset(-9, 0)), Some(CellState::Occupied));
        assert_eq!(submap.get(center.offset(0, 10)), Some(CellState::Occupied));
        // Outside the ring nothing is known
        assert_eq!(submap.get(GridCoord::new(0, 0)), Some(CellState::Uncertain));
        assert_eq!(
            submap.get(GridCoord::new(submap.width() as i32 - 1, 0)),
            Some(CellState::Uncertain)
        );
    }

    #[test]
    fn test_walls_stamp_two_by_two() {
        let submapper = Submapper::new(100).unwrap();
        let submap = submapper.build_from_samples(&[
            sample(0.0, 500),
            sample(FRAC_PI_2, 800),
            sample(PI, 800),
            sample(3.0 * FRAC_PI_2, 800),
        ]);
        let p = submap.center().offset(5, 0);
        for (dx, dy) in WALL_STAMP {
            assert_eq!(submap.get(p.offset(dx, dy)), Some(CellState::Occupied));
        }
    }

    #[test]
    fn test_outline_closes_to_first_point() {
        let submapper = Submapper::new(100).unwrap();
        // Open arc: first and last points are joined by the closing line
        let samples = [
            sample(0.0, 800),
            sample(FRAC_PI_2, 800),
            sample(PI, 800),
        ];
        let submap = submapper.build_from_samples(&samples);
        let center = submap.center();
        // The closing line from (-8, 0) to (8, 0) passes through the sensor row
        assert_eq!(submap.get(center.offset(-4, 0)), Some(CellState::Free));
        assert_eq!(submap.get(center.offset(4, 0)), Some(CellState::Free));
        // Inside the triangle
        assert_eq!(submap.get(center.offset(0, 4)), Some(CellState::Free));
        assert_eq!(submap.get(center.offset(8, 0)), Some(CellState::Occupied));
    }

    #[test]
    fn test_flood_fill_stops_at_obstacles() {
        let mut grid = OccupancyGrid::new(7, 7);
        for i in 1..6 {
            grid.set(GridCoord::new(i, 1), CellState::Occupied);
            grid.set(GridCoord::new(i, 5), CellState::Occupied);
            grid.set(GridCoord::new(1, i), CellState::Occupied);
            grid.set(GridCoord::new(5, i), CellState::Occupied);
        }

        let filled = flood_fill(&mut grid, GridCoord::new(3, 3));
        assert_eq!(filled, 9);
        assert_eq!(grid.get(GridCoord::new(0, 0)), Some(CellState::Uncertain));
        assert_eq!(grid.get(GridCoord::new(1, 1)), Some(CellState::Occupied));
        assert_eq!(grid.get(GridCoord::new(4, 4)), Some(CellState::Free));
    }

    #[test]
    fn test_flood_fill_open_grid_terminates() {
        let mut grid = OccupancyGrid::new(30, 20);
        assert_eq!(flood_fill(&mut grid, GridCoord::new(0, 0)), 600);
        assert_eq!(flood_fill(&mut grid, GridCoord::new(5, 5)), 0);
        assert_eq!(flood_fill(&mut grid, GridCoord::new(-1, 5)), 0);
    }
}
