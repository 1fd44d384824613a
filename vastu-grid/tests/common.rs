//! Test utilities for VastuGrid integration tests.

#![allow(dead_code)]

use drishti_io::g2::sim::RoomSimulator;
use drishti_io::{ChecksumPolicy, Cycle, ScanDecoder};
use vastu_grid::{CellState, GridCoord, OccupancyGrid};

/// Room used across tests: 4 m × 3 m, sensor in the middle.
pub const ROOM_WIDTH_MM: f64 = 4000.0;
pub const ROOM_HEIGHT_MM: f64 = 3000.0;

/// Route `log` output through the test harness; safe to call repeatedly.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Simulated room stream with a fixed seed.
pub fn room_stream(revolutions: usize, noise_mm: f64) -> Vec<u8> {
    RoomSimulator::new(ROOM_WIDTH_MM, ROOM_HEIGHT_MM, 7)
        .with_layout(12, 60)
        .with_range_noise(noise_mm)
        .stream(revolutions)
}

/// Decode a byte stream into revolutions.
pub fn decode(bytes: &[u8]) -> Vec<Cycle> {
    let mut decoder = ScanDecoder::new(ChecksumPolicy::Reject);
    let mut cycles = Vec::new();
    decoder.feed(bytes, &mut cycles);
    cycles
}

/// Distance from `from` to the first non-FREE cell walking in (dx, dy).
pub fn distance_to_boundary(grid: &OccupancyGrid, from: GridCoord, dx: i32, dy: i32) -> Option<(i32, CellState)> {
    let mut step = 1;
    loop {
        let cell = from.offset(dx * step, dy * step);
        match grid.get(cell)? {
            CellState::Free => step += 1,
            state => return Some((step, state)),
        }
    }
}
