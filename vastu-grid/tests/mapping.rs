//! End-to-end mapping tests: byte stream → revolutions → submaps → global grid.

mod common;

use common::{decode, distance_to_boundary, init_logging, room_stream};
use drishti_io::{G2Driver, LidarConfig, MockTransport};
use std::time::Duration;
use vastu_grid::{CellState, FusionWorker, GlobalMapper, GridCoord, MapperConfig, Submapper};

fn config() -> MapperConfig {
    MapperConfig {
        resolution_mm: 50,
        initial_width: 100,
        initial_height: 100,
    }
}

#[test]
fn test_room_walls_at_expected_range() {
    let cycles = decode(&room_stream(3, 0.0));
    assert_eq!(cycles.len(), 2);

    let mut worker = FusionWorker::from_config(&config()).unwrap();
    let result = worker.fuse_cycle(&cycles[0]);
    assert!(!result.resized);

    let grid = worker.mapper().grid();
    let center = worker.mapper().drawing_point();
    assert_eq!(grid.get(center), Some(CellState::Free));

    // 2000 mm / 50 mm = 40 cells to the side walls, 30 to the end walls
    for (dx, dy, expected) in [(1, 0, 40), (-1, 0, 40), (0, 1, 30), (0, -1, 30)] {
        let (steps, state) = distance_to_boundary(grid, center, dx, dy).unwrap();
        assert_eq!(state, CellState::Occupied, "direction ({}, {})", dx, dy);
        assert!(
            (expected - 3..=expected + 1).contains(&steps),
            "direction ({}, {}): wall at {} cells",
            dx,
            dy,
            steps
        );
    }
}

#[test]
fn test_noisy_revolutions_keep_interior_free() {
    let cycles = decode(&room_stream(6, 10.0));
    assert_eq!(cycles.len(), 5);

    let mut worker = FusionWorker::from_config(&config()).unwrap();
    for cycle in &cycles {
        worker.fuse_cycle(cycle);
    }

    let grid = worker.mapper().grid();
    let center = worker.mapper().drawing_point();
    for y in -20..=20 {
        for x in -30..=30 {
            assert_eq!(
                grid.get(center.offset(x, y)),
                Some(CellState::Free),
                "interior cell ({}, {})",
                x,
                y
            );
        }
    }
    assert_eq!(worker.stats().cycles_fused, 5);
}

#[test]
fn test_moving_observer_grows_map() {
    init_logging();
    let cycles = decode(&room_stream(4, 0.0));
    let submapper = Submapper::from_config(&config()).unwrap();
    let mut mapper = GlobalMapper::from_config(&config()).unwrap();

    let positions = [GridCoord::ZERO, GridCoord::new(60, 0), GridCoord::new(60, -50)];
    for (cycle, position) in cycles.iter().zip(positions) {
        mapper.update_observer_pos(position);
        mapper.update(&submapper.build(cycle));
    }

    assert!(mapper.resize_count() >= 2);
    let grid = mapper.grid();
    assert!(grid.width() >= 150);

    // The first room is still there after the grid grew
    mapper.update_observer_pos(GridCoord::ZERO);
    let origin = mapper.drawing_point();
    assert_eq!(mapper.grid().get(origin), Some(CellState::Free));
    let (steps, state) = distance_to_boundary(mapper.grid(), origin, -1, 0).unwrap();
    assert_eq!(state, CellState::Occupied);
    assert!((37..=41).contains(&steps));
}

#[test]
fn test_driver_to_fusion_thread() {
    init_logging();
    let transport = MockTransport::new();
    transport.inject_read(&room_stream(5, 5.0));

    let lidar_config = LidarConfig {
        poll_timeout_ms: 10,
        ..LidarConfig::default()
    };
    let mut lidar = G2Driver::new(transport, lidar_config).unwrap();
    let fusion = FusionWorker::from_config(&config()).unwrap().spawn().unwrap();

    lidar.enable().unwrap();
    for _ in 0..4 {
        let cycle = lidar.read_cycle(Duration::from_secs(2)).unwrap();
        fusion.submit_cycle(cycle).unwrap();
    }
    lidar.disable().unwrap();

    let snapshot = fusion.snapshot(Duration::from_secs(5)).unwrap();
    assert_eq!(snapshot.stats.cycles_fused, 4);
    assert_eq!(snapshot.grid.get(snapshot.drawing_point), Some(CellState::Free));

    let counts = snapshot.grid.count_by_state();
    assert!(counts.free > 60 * 40);
    assert!(counts.occupied > 0);

    let worker = fusion.shutdown().unwrap();
    assert_eq!(worker.mapper().grid(), &snapshot.grid);
}

#[test]
fn test_export_layout() {
    let cycles = decode(&room_stream(2, 0.0));
    let mut worker = FusionWorker::from_config(&config()).unwrap();
    worker.fuse_cycle(&cycles[0]);

    let grid = worker.mapper().grid();
    let bytes = grid.as_bytes();
    assert_eq!(bytes.len(), grid.width() * grid.height());
    assert!(bytes.iter().all(|&b| b == 0 || b == 128 || b == 255));

    let center = worker.mapper().drawing_point();
    let index = center.y as usize * grid.width() + center.x as usize;
    assert_eq!(bytes[index], 0);
}
